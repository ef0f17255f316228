//! ChromaDB-backed memory store for Mindgate.
//!
//! Implements the `MemoryStore` seam against the ChromaDB v1 REST API.
//! Embeddings are a fixed placeholder vector for now; retrieval relies on
//! the metadata filter, not semantic similarity.

mod chroma;

pub use chroma::ChromaStore;
