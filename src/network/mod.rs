//! Road and river networks over the world grid.

pub mod pathing;
pub mod rivers;
pub mod roads;

pub use pathing::{find_path, RoutedPath, Step};
pub use rivers::{RiverNetwork, RiverNetworkBuilder, RiverParams};
pub use roads::{cities_connected, components, RoadJunction, RoadNetwork, RoadNetworkBuilder, RoadParams};
