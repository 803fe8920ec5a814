//! Infrastructure services

mod movie_query_service;

pub use movie_query_service::{
    MovieQueryService, LIST_LIMIT, MAX_TOP_RATED, TITLE_SEARCH_LIMIT, TOP_DIRECTORS,
};
