use super::*;

pub use datetime::*;
pub use entry::*;
pub use error::*;
pub use filter::*;
pub use fused_feed::*;
pub use republish::*;
pub use source::*;
pub use spec::*;

pub(crate) mod internal {
    pub use std::collections::HashMap;
    pub use std::sync::Arc;
    pub use std::time::Duration;

    pub use serde::{Deserialize, Serialize};
}
