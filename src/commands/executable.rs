use crate::frame::Frame;
use crate::store::Store;

/// A fully parsed command that can run against the store. Execution is
/// infallible: anything that can go wrong is reported inside the reply
/// frame, never as a handler-level fault.
#[allow(async_fn_in_trait)]
pub trait Executable {
    async fn exec(self, store: Store) -> Frame;
}
