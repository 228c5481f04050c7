mod action_sender;
mod config;
mod effect;
mod effect_registry;
mod engine;
mod reducer;
pub mod shop;
mod store;
mod store_event;
mod subscription;
pub mod test_store;

pub use action_sender::{ActionSender, AnyActionSender};
pub use config::StoreConfig;
pub use effect::{AsyncActionJob, CancelId, Effect, EffectValue};
pub use reducer::Reducer;
pub use store::Store;
pub use subscription::{ActionSelection, StateSelection};
pub use test_store::TestStore;
