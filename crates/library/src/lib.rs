//! Video library: discovery of video files under a root directory and safe
//! resolution of client-supplied relative paths against that root.
//!
//! The root itself lives in a [`VideoRoot`] handle shared by every request
//! handler and replaced through [`VideoRoot::set`].

mod index;
mod resolve;
mod root;

pub use index::{count_videos, index_videos, is_video, walk_videos, VideoEntry, VIDEO_EXTENSIONS};
pub use resolve::{confine, normalize, resolve_video, ResolveError, ResolvedVideo};
pub use root::{RootChange, SetRootError, VideoRoot};
