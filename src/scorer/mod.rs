pub mod edge_scorer;
pub mod projection;

pub use edge_scorer::{compute_edge, is_star, PregameInputs, TeamProfile};
pub use projection::{project_total, projection_reading};
