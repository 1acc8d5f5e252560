// Domain layer: models, geodesy and ports. No adapter dependencies.

pub mod geo;
pub mod model;
pub mod ports;
