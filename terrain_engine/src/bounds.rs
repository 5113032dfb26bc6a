use glam::Vec3;

/// Axis-aligned box in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl SceneBounds {
    pub fn from_point(position: Vec3) -> Self {
        Self {
            min: position.to_array(),
            max: position.to_array(),
        }
    }

    /// Bounds of every point in the iterator, `None` when it is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.update(point.to_array());
        }
        Some(bounds)
    }

    pub fn update(&mut self, position: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(position[axis]);
            self.max[axis] = self.max[axis].max(position[axis]);
        }
    }

    pub fn include_bounds(&mut self, other: &SceneBounds) {
        self.update(other.min);
        self.update(other.max);
    }

    pub fn union(a: Option<SceneBounds>, b: Option<SceneBounds>) -> Option<SceneBounds> {
        match (a, b) {
            (Some(mut a), Some(b)) => {
                a.include_bounds(&b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn center(&self) -> Vec3 {
        (Vec3::from_array(self.min) + Vec3::from_array(self.max)) * 0.5
    }

    /// Full edge lengths along each axis.
    pub fn size(&self) -> Vec3 {
        Vec3::from_array(self.max) - Vec3::from_array(self.min)
    }

    pub fn largest_extent(&self) -> f32 {
        self.size().max_element()
    }

    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }
}
