// 3D R-tree spatial index over axis-aligned boxes: bulk loading, insert/remove, box and ray queries

pub use math_rb3d::*;
pub use containers_rb3d::*;
