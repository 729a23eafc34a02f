//! Small helpers shared by the resolver, parser and serializer.

pub mod qname;
