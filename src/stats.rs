//! Counters collected while optimizing, for the report the CLI prints.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub elements_removed: usize,
    pub attributes_removed: usize,
    pub comments_removed: usize,
    pub style_properties_fixed: usize,
    pub rasters_embedded: usize,
    pub path_segments_removed: usize,
    pub points_removed_from_polygon: usize,
    pub transforms_optimized: usize,
    pub ids_removed: usize,
    pub ids_shortened: usize,
    pub bytes_saved_in_path_data: usize,
    pub bytes_saved_in_colors: usize,
    pub bytes_saved_in_comments: usize,
    pub bytes_saved_in_ids: usize,
    pub bytes_saved_in_lengths: usize,
    pub bytes_saved_in_transforms: usize,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, usize); 16] = [
            ("Number of elements removed", self.elements_removed),
            ("Number of attributes removed", self.attributes_removed),
            ("Number of unreferenced IDs removed", self.ids_removed),
            ("Number of IDs shortened", self.ids_shortened),
            ("Number of comments removed", self.comments_removed),
            ("Number of style properties fixed", self.style_properties_fixed),
            ("Number of raster images embedded", self.rasters_embedded),
            ("Number of path segments reduced/removed", self.path_segments_removed),
            ("Number of points removed from polygons", self.points_removed_from_polygon),
            ("Number of transforms optimized", self.transforms_optimized),
            ("Number of bytes saved in path data", self.bytes_saved_in_path_data),
            ("Number of bytes saved in colors", self.bytes_saved_in_colors),
            ("Number of bytes saved in comments", self.bytes_saved_in_comments),
            ("Number of bytes saved in IDs", self.bytes_saved_in_ids),
            ("Number of bytes saved in lengths", self.bytes_saved_in_lengths),
            ("Number of bytes saved in transformations", self.bytes_saved_in_transforms),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<42}{value}")?;
        }
        Ok(())
    }
}
