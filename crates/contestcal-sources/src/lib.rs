//! Contest sources.
//!
//! Each source turns one external contest listing into normalized
//! [`ContestRecord`](contestcal_core::ContestRecord)s:
//!
//! - [`AtCoderSource`] - scrapes the upcoming-contests table of atcoder.jp
//! - [`CodeforcesSource`] - queries the Codeforces `contest.list` API
//!
//! Sources filter by their own naming rules; they do not window by time.

pub mod atcoder;
pub mod codeforces;
pub mod error;
pub mod filter;
mod http;
pub mod source;

pub use atcoder::{AtCoderConfig, AtCoderSource, RowError};
pub use codeforces::{CodeforcesConfig, CodeforcesSource};
pub use error::{SourceError, SourceResult};
pub use filter::MarkerRule;
pub use source::ContestSource;
