//! Resource hooks.
//!
//! Each hook binds one logical resource key and fetcher to the shared
//! [`ResourceStore`](schola_cache::ResourceStore) and layers its
//! domain-specific derived fields on top of the raw snapshot.

pub mod account;
pub mod guard;
pub mod managed;
pub mod network;
pub mod owned;
pub mod wallet_info;

pub use account::{AccountHook, AccountView, AdminAllowlist};
pub use guard::{AdminAccess, AdminGate};
pub use managed::{ManagedCoursesHook, ManagedCoursesView};
pub use network::{NetworkHook, NetworkView};
pub use owned::{OwnedCourseHook, OwnedCourseView, OwnedCoursesHook, OwnedCoursesView};
pub use wallet_info::{wallet_info, WalletInfo};
