//! Signed `track.scrobble` submissions to an audioscrobbler-compatible web service.
//!
//! A [`TrackPlay`] supplied by the caller is turned into [`ScrobbleParameters`],
//! signed with the shared secret and posted as a form to the upstream endpoint.
//! The `status` attribute of the `lfm` element in the reply is handed back verbatim.

mod client;
mod errors;
mod params;
mod response;

pub use client::{Credentials, DEFAULT_ENDPOINT, Scrobbler};
pub use errors::{ClientBuildError, ScrobbleError};
pub use params::{METHOD, ScrobbleParameters, SignedScrobble, TrackPlay};
pub use response::{ScrobbleStatus, UpstreamError, parse_status};
