//! Seek requests sent to start a block delivery stream.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SeekSpecified {
    #[prost(uint64, tag = "1")]
    pub number: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SeekNextCommit {}

/// Where in the chain to position a delivery stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SeekPosition {
    #[prost(oneof = "seek_position::Type", tags = "1, 2")]
    pub r#type: ::core::option::Option<seek_position::Type>,
}

/// Nested message and enum types in `SeekPosition`.
pub mod seek_position {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        /// An exact block number.
        #[prost(message, tag = "1")]
        Specified(super::SeekSpecified),
        /// The next block committed after the stream is opened.
        #[prost(message, tag = "2")]
        NextCommit(super::SeekNextCommit),
    }
}

impl SeekPosition {
    pub fn specified(number: u64) -> Self {
        Self {
            r#type: Some(seek_position::Type::Specified(SeekSpecified { number })),
        }
    }

    pub fn next_commit() -> Self {
        Self {
            r#type: Some(seek_position::Type::NextCommit(SeekNextCommit {})),
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
)]
#[repr(i32)]
pub enum SeekBehavior {
    /// Block until the requested position exists rather than failing.
    BlockUntilReady = 0,
    FailIfNotReady = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SeekInfo {
    #[prost(message, optional, tag = "1")]
    pub start: ::core::option::Option<SeekPosition>,
    #[prost(message, optional, tag = "2")]
    pub stop: ::core::option::Option<SeekPosition>,
    #[prost(enumeration = "SeekBehavior", tag = "3")]
    pub behavior: i32,
}
