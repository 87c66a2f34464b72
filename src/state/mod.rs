//! Client-held screen state.

mod bag;

pub use bag::StateBag;
