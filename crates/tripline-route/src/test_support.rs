//! Recording map surface shared by the unit tests.

use std::collections::BTreeMap;

use crate::bounds::CameraFit;
use crate::renderer::{MapSurface, MarkerStyle};
use crate::types::{LonLat, PlannerError, Route, Waypoint};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    AddMarker(LonLat, MarkerStyle),
    RemoveMarker(u64),
    SetPath(usize),
    RemovePath,
    FlyTo(LonLat, f64),
    Fit(CameraFit),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub markers: BTreeMap<u64, (LonLat, MarkerStyle)>,
    pub path: Option<Vec<LonLat>>,
    pub fail: bool,
    next_id: u64,
}

impl RecordingSurface {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn live_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn camera_moves(&self) -> Vec<&SurfaceCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::FlyTo(..) | SurfaceCall::Fit(_)))
            .collect()
    }

    fn check(&self) -> Result<(), PlannerError> {
        if self.fail {
            Err(PlannerError::SurfaceMutationFailed("surface torn down".into()))
        } else {
            Ok(())
        }
    }
}

impl MapSurface for RecordingSurface {
    type Marker = u64;

    fn add_marker(
        &mut self,
        _waypoint: &Waypoint,
        coords: LonLat,
        style: MarkerStyle,
    ) -> Result<u64, PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::AddMarker(coords, style));
        self.next_id += 1;
        self.markers.insert(self.next_id, (coords, style));
        Ok(self.next_id)
    }

    fn remove_marker(&mut self, marker: u64) -> Result<(), PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::RemoveMarker(marker));
        self.markers.remove(&marker);
        Ok(())
    }

    fn set_path(&mut self, route: &Route) -> Result<(), PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::SetPath(route.len()));
        self.path = Some(route.points().to_vec());
        Ok(())
    }

    fn remove_path(&mut self) -> Result<(), PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::RemovePath);
        self.path = None;
        Ok(())
    }

    fn fly_to(&mut self, center: LonLat, zoom: f64) -> Result<(), PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::FlyTo(center, zoom));
        Ok(())
    }

    fn fit_bounds(&mut self, fit: &CameraFit) -> Result<(), PlannerError> {
        self.check()?;
        self.calls.push(SurfaceCall::Fit(*fit));
        Ok(())
    }
}
