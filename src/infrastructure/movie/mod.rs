//! Movie document store implementations

mod in_memory;

pub use in_memory::InMemoryMovieRepository;
