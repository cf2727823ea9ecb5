// src/domain/camera.rs

/// Street View camera settings for one photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// Horizontal field of view in degrees.
    pub fov: u32,
    /// Up/down angle in degrees.
    pub pitch: f64,
}

/// Frames the building by height: taller buildings get a wider field of view
/// and a steeper pitch. Missing or non-finite floor counts use the 2-story default.
pub fn aim(floors: Option<f64>) -> (u32, u32) {
    let floors = match floors {
        Some(f) if f.is_finite() => f,
        _ => return (65, 10),
    };

    if floors >= 10.0 {
        (90, 30)
    } else if floors >= 8.0 {
        (90, 25)
    } else if floors >= 6.0 {
        (86, 20)
    } else if floors >= 5.0 {
        (81, 20)
    } else if floors >= 4.0 {
        (76, 15)
    } else if floors >= 3.0 {
        (72, 10)
    } else {
        (65, 10)
    }
}

/// Camera for a lot. A configured pitch wins over the framed one.
pub fn camera_for(floors: Option<f64>, pitch_override: Option<f64>) -> CameraParams {
    let (fov, pitch) = aim(floors);
    CameraParams {
        fov,
        pitch: pitch_override.unwrap_or(pitch as f64),
    }
}
