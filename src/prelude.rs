//! Common imports pulled in across most modules. Grounded on the teacher's
//! own `prelude.rs` shape (one flat re-export surface) but scoped down to
//! what this crate's modules actually use.

pub use std::collections::HashMap;
pub use std::sync::Arc;

pub use anyhow::{anyhow, bail, Result};
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use tokio::sync::{Mutex, RwLock};
pub use tokio::time::{sleep, timeout, Duration};

pub use crate::config;
pub use crate::errors::CoreError;
pub use crate::logger::{self, LogTag};
