mod cartesian_point;
mod contour;
mod polygon;

pub use cartesian_point::{
    CartesianPoint2d, CartesianPoint2dFloat, CartesianPoint3d, NewCartesianPoint2d,
    NewCartesianPoint3d,
};

pub use contour::{CartesianClosedContour, CartesianContour, Winding};
pub use polygon::CartesianPolygon;
