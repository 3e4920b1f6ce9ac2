use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::PyTuple;
use tracing::debug;

use crate::bridge::{BridgeError, CallableHandle, ForeignValue, ModuleHandle, Runtime};
use crate::geometry;
use crate::models::{CornerLayout, CornerParams, Rectangle};

pub const LOAD_IMAGE: &str = "LoadImage";
pub const LOAD_WEIGHTS: &str = "LoadReadyWeights";
pub const FIND_CORNERS: &str = "GetCornersFromGeneratedMask";
pub const SAVE_IMAGE: &str = "SaveImage";

/// The four operations the session needs from a segmentation backend
pub trait Segmenter {
    type Image;
    type Model;
    type Corners;

    fn load_image(&self, path: &Path) -> Result<Self::Image, BridgeError>;

    fn load_weights(&self, path: &Path) -> Result<Self::Model, BridgeError>;

    /// Run the model on `image` and reduce the mask to two corners
    fn find_corners(
        &self,
        image: &Self::Image,
        model: &Self::Model,
        params: &CornerParams,
    ) -> Result<Self::Corners, BridgeError>;

    fn rectangle(&self, corners: &Self::Corners) -> Result<Rectangle, BridgeError>;

    /// Draw the corners onto `image` and write it to `path`
    fn save_image(
        &self,
        image: &Self::Image,
        corners: &Self::Corners,
        path: &Path,
    ) -> Result<(), BridgeError>;
}

/// Mask R-CNN backend implemented by a Python module
///
/// All four entry points are resolved up front so a missing function is
/// reported before any work starts.
pub struct MaskRcnn<'py> {
    runtime: Runtime<'py>,
    module: ModuleHandle<'py>,
    load_image: CallableHandle<'py>,
    load_weights: CallableHandle<'py>,
    find_corners: CallableHandle<'py>,
    save_image: CallableHandle<'py>,
    layout: CornerLayout,
}

impl<'py> MaskRcnn<'py> {
    /// Import `module` and resolve its entry points.
    pub fn resolve(
        runtime: Runtime<'py>,
        module: &str,
        layout: CornerLayout,
    ) -> Result<Self, BridgeError> {
        let module = runtime.import(module)?;
        Ok(Self {
            load_image: module.resolve(LOAD_IMAGE)?,
            load_weights: module.resolve(LOAD_WEIGHTS)?,
            find_corners: module.resolve(FIND_CORNERS)?,
            save_image: module.resolve(SAVE_IMAGE)?,
            runtime,
            module,
            layout,
        })
    }

    /// Paths cross as `str` decoded with the filesystem encoding, so names
    /// that are not valid UTF-8 still round-trip.
    fn path_arg(&self, path: &Path) -> PyObject {
        path.to_object(self.runtime.python())
    }

    fn require_value(
        function: &CallableHandle<'py>,
        value: ForeignValue<'py>,
    ) -> Result<ForeignValue<'py>, BridgeError> {
        if value.is_none() {
            return Err(BridgeError::MalformedResult {
                function: function.name().to_string(),
                reason: "returned None".to_string(),
            });
        }
        Ok(value)
    }
}

impl<'py> Segmenter for MaskRcnn<'py> {
    type Image = ForeignValue<'py>;
    type Model = ForeignValue<'py>;
    type Corners = ForeignValue<'py>;

    fn load_image(&self, path: &Path) -> Result<Self::Image, BridgeError> {
        let args = PyTuple::new_bound(self.runtime.python(), [self.path_arg(path)]);
        let image = self.load_image.invoke(args)?;
        debug!(path = %path.display(), kind = %image.type_name(), "image loaded");
        Self::require_value(&self.load_image, image)
    }

    fn load_weights(&self, path: &Path) -> Result<Self::Model, BridgeError> {
        let args = PyTuple::new_bound(self.runtime.python(), [self.path_arg(path)]);
        let model = self.load_weights.invoke(args)?;
        Self::require_value(&self.load_weights, model)
    }

    fn find_corners(
        &self,
        image: &Self::Image,
        model: &Self::Model,
        params: &CornerParams,
    ) -> Result<Self::Corners, BridgeError> {
        let py = self.runtime.python();
        let args = PyTuple::new_bound(
            py,
            [
                image.to_arg(),
                model.to_arg(),
                params.tolerance.to_object(py),
                params.per_corner.to_object(py),
                (params.scale.x, params.scale.y).to_object(py),
            ],
        );
        let corners = self.find_corners.invoke(args)?;
        Self::require_value(&self.find_corners, corners)
    }

    fn rectangle(&self, corners: &Self::Corners) -> Result<Rectangle, BridgeError> {
        geometry::extract_rectangle(corners, self.layout, self.find_corners.name())
    }

    fn save_image(
        &self,
        image: &Self::Image,
        corners: &Self::Corners,
        path: &Path,
    ) -> Result<(), BridgeError> {
        let args = PyTuple::new_bound(
            self.runtime.python(),
            [image.to_arg(), corners.to_arg(), self.path_arg(path)],
        );
        self.save_image.invoke(args)?;
        Ok(())
    }
}
