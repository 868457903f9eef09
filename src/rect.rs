use crate::Point2;
use std::ops::Add;

/// A Rectangle defined by its top left corner, width and height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect<T> {
    /// The x coordinate of the top left corner.
    pub x: T,
    /// The y coordinate of the top left corner.
    pub y: T,
    /// The rectangle's width.
    pub width: T,
    /// The rectangle's height.
    pub height: T,
}

impl<T: Copy> Rect<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T> Rect<T>
where
    T: Add<Output = T> + Copy,
{
    pub fn x_min(&self) -> T {
        self.x
    }

    pub fn x_max(&self) -> T {
        self.x + self.width
    }

    pub fn y_min(&self) -> T {
        self.y
    }

    pub fn y_max(&self) -> T {
        self.y + self.height
    }
}

impl Rect<isize> {
    /// Half-open containment: the max edges are outside the rectangle.
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.x_min()
            && point.x < self.x_max()
            && point.y >= self.y_min()
            && point.y < self.y_max()
    }

    /// Every point inside the rectangle, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point2> {
        let (x_min, x_max) = (self.x_min(), self.x_max());

        (self.y_min()..self.y_max())
            .flat_map(move |y| (x_min..x_max).map(move |x| Point2::new(x, y)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_excludes_the_far_edges() {
        let rect = Rect::new(0, 0, 4, 3);

        assert!(rect.contains(&Point2::new(0, 0)));
        assert!(rect.contains(&Point2::new(3, 2)));
        assert!(!rect.contains(&Point2::new(4, 0)));
        assert!(!rect.contains(&Point2::new(0, 3)));
        assert!(!rect.contains(&Point2::new(-1, 0)));
        assert!(!rect.contains(&Point2::new(0, -1)));
    }

    #[test]
    fn points_walks_rows_in_order() {
        let rect = Rect::new(0, 0, 2, 2);
        let points: Vec<_> = rect.points().collect();

        assert_eq!(
            points,
            vec![
                Point2::new(0, 0),
                Point2::new(1, 0),
                Point2::new(0, 1),
                Point2::new(1, 1),
            ]
        );
    }
}
