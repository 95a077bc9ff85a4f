//! Membership service provider identity encoding.

/// The wire form of a network identity: the membership service provider that
/// issued the credentials plus the credential bytes themselves (typically a
/// certificate). Its serialization is the "creator" field of every signature
/// header and must be derived exactly once per identity.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub msp_id: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: ::prost::alloc::vec::Vec<u8>,
}
