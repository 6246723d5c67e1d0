//! Response schemas for the MediaWiki action API shapes consumed by wikiquery.
//!
//! Only the shapes the client actually reads are typed; everything else
//! stays reachable through [`ApiResponse::data`].
//!
//! # Shapes covered
//!
//! | Request | Type |
//! |---------|------|
//! | any | [`ApiResponse`], [`ApiError`] |
//! | `action=query&prop=info` | [`PageInfoResponse`] |
//! | `action=query&prop=revisions&rvprop=content` | [`RevisionsResponse`] |
//! | `action=query&list=users` | [`UsersResponse`] |

pub mod envelope;
pub mod error;
pub mod flag;
pub mod page;
pub mod response;
pub mod user;

pub use envelope::QueryEnvelope;
pub use error::ApiError;
pub use page::{
    PageInfo, PageInfoResponse, PageKey, PageRecord, Pages, PagesQuery, Revision,
    RevisionsResponse, Slot, TitleMapping,
};
pub use response::{ApiResponse, Payload};
pub use user::{UserEntry, UsersQuery, UsersResponse};
