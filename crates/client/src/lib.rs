pub mod actions;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod notify;
pub mod outside_click;
pub mod rank_editor;
pub mod search_box;
pub mod sources;
pub mod traits;

pub use actions::{ActionOutcome, ActionRunner, PanelAction};
pub use config::PanelConfig;
pub use debounce::Debouncer;
pub use error::{PanelError, Result};
pub use form::FormState;
pub use notify::{LogNotifier, MemoryNotifier, Notification, NotificationLevel};
pub use outside_click::{OutsideClickRouter, PointerTarget};
pub use rank_editor::{PersistOutcome, PersistState, RankEditor, RankEditorConfig};
pub use search_box::{ResultPanel, SearchBox, SearchBoxConfig, Selected};
pub use sources::panel::PanelClient;
pub use traits::{ActionEndpoint, CandidateSource, Confirm, HostForm, Notifier, RankPersistence};
