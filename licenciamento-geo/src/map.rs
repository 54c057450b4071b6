//! Adaptateur entre les événements du widget carte et les couches
//!
//! Le widget lui-même reste derrière le trait [`MapView`]. [`Viewport`] en
//! fournit une implémentation sans rendu, utile en ligne de commande et
//! dans les tests.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use geocamadas::bounds::layer_bounds;
use geocamadas::{GeoFeature, GeometryKind, LatLng, LatLngBounds, LayerSet};
use serde::Serialize;
use tracing::{debug, info};

/// Taille d'une tuile en pixels
const TILE_SIZE: f64 = 256.0;

/// Latitude maximale de la projection Web Mercator
const MAX_MERCATOR_LAT: f64 = 85.0;

/// Options de cadrage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitOptions {
    /// Marge en pixels de chaque côté
    pub padding: u32,
    pub max_zoom: u8,
    pub animate: bool,
    /// Durée de l'animation en secondes
    pub duration: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: 50,
            max_zoom: 12,
            animate: true,
            duration: 1.0,
        }
    }
}

/// Widget carte
pub trait MapView {
    fn fit_bounds(&mut self, bounds: LatLngBounds, options: FitOptions);
}

/// État de l'adaptateur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapState {
    #[default]
    Idle,
    ComputingBounds,
    Complete,
}

/// Issue d'une demande de zoom, transmise au rappel de fin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomOutcome {
    /// Emprise cadrée
    Framed(LatLngBounds),
    /// Couche absente du jeu
    LayerNotFound,
    /// Aucune coordonnée exploitable
    NoCoordinates,
}

/// Adaptateur carte
#[derive(Debug, Default)]
pub struct MapAdapter {
    state: MapState,
    ready: bool,
    options: FitOptions,
}

impl MapAdapter {
    pub fn new(options: FitOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn options(&self) -> FitOptions {
        self.options
    }

    /// Le widget est prêt : on le transmet au gestionnaire de l'appelant
    pub fn on_ready<F>(&mut self, view: &mut dyn MapView, handler: F)
    where
        F: FnOnce(&mut dyn MapView),
    {
        self.ready = true;
        debug!("Map ready");
        handler(view);
    }

    /// Cadre la carte sur une couche.
    ///
    /// Sans cible, rien ne se passe et le rappel n'est pas appelé. Avec une
    /// cible, le rappel est toujours appelé, même si la couche est absente
    /// ou vide.
    pub fn zoom_to_layer<F>(
        &mut self,
        target: Option<&str>,
        layers: &LayerSet,
        view: &mut dyn MapView,
        on_complete: F,
    ) where
        F: FnOnce(ZoomOutcome),
    {
        let Some(layer_id) = target else {
            return;
        };

        self.transition(MapState::ComputingBounds);
        let outcome = match layers.get(layer_id) {
            None => ZoomOutcome::LayerNotFound,
            Some(layer) => match layer_bounds(layer) {
                None => ZoomOutcome::NoCoordinates,
                Some(bounds) => {
                    view.fit_bounds(bounds, self.options);
                    ZoomOutcome::Framed(bounds)
                }
            },
        };
        self.transition(MapState::Complete);

        info!(layer = layer_id, outcome = ?outcome, "Zoom to layer");
        on_complete(outcome);
        self.transition(MapState::Idle);
    }

    /// Clic droit sur une feature rendue : transmis tel quel.
    ///
    /// Seules les features polygonales sont cliquables ; retourne `false`
    /// pour les autres.
    pub fn on_right_click<F>(&self, feature: &GeoFeature, at: LatLng, handler: F) -> bool
    where
        F: FnOnce(&GeoFeature, LatLng),
    {
        match feature.kind() {
            GeometryKind::Polygon | GeometryKind::MultiPolygon => {
                debug!(feature = %feature.id, lat = at.lat, lng = at.lng, "Right click");
                handler(feature, at);
                true
            }
            GeometryKind::Point => false,
        }
    }

    fn transition(&mut self, to: MapState) {
        debug!(from = ?self.state, to = ?to, "Map state");
        self.state = to;
    }
}

/// Caméra calculée par [`Viewport`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub center: LatLng,
    pub zoom: u8,
    pub animate: bool,
    pub duration: f64,
}

/// Fenêtre carte de taille fixe, sans rendu
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    camera: Option<Camera>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            camera: None,
        }
    }

    /// Dernière caméra cadrée
    pub fn camera(&self) -> Option<Camera> {
        self.camera
    }

    /// Centre et niveau de zoom entier montrant `bounds` en entier
    pub fn camera_for(&self, bounds: LatLngBounds, options: FitOptions) -> Camera {
        let (west, south) = project(bounds.south_west);
        let (east, north) = project(bounds.north_east);

        let padding = 2.0 * f64::from(options.padding);
        let avail_x = (f64::from(self.width) - padding).max(1.0);
        let avail_y = (f64::from(self.height) - padding).max(1.0);

        let zoom = [(east - west, avail_x), (north - south, avail_y)]
            .iter()
            .filter(|(span, _)| *span > 0.0)
            .map(|(span, avail)| (avail * 2.0 * PI / (span * TILE_SIZE)).log2())
            .fold(f64::from(options.max_zoom), f64::min)
            .floor()
            .clamp(0.0, f64::from(options.max_zoom));

        Camera {
            center: unproject((west + east) / 2.0, (south + north) / 2.0),
            zoom: zoom as u8,
            animate: options.animate,
            duration: options.duration,
        }
    }
}

impl MapView for Viewport {
    fn fit_bounds(&mut self, bounds: LatLngBounds, options: FitOptions) {
        let camera = self.camera_for(bounds, options);
        debug!(
            lat = camera.center.lat,
            lng = camera.center.lng,
            zoom = camera.zoom,
            "Viewport fitted"
        );
        self.camera = Some(camera);
    }
}

/// Web Mercator sur la sphère unité : `(λ, ln(tan(π/4 + φ/2)))`
fn project(point: LatLng) -> (f64, f64) {
    let lat = point
        .lat
        .clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
        .to_radians();
    let x = point.lng.to_radians();
    let y = (FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

fn unproject(x: f64, y: f64) -> LatLng {
    let lat = 2.0 * y.exp().atan() - FRAC_PI_2;
    LatLng::new(lat.to_degrees(), x.to_degrees())
}
