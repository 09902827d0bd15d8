//! Pixel geometry: row/table coordinate math and path-string primitives.

/// Fixed sizing constants for the diagram. Rows are fixed-width; the
/// renderer clips labels that do not fit.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub row_width: f64,
    pub row_height: f64,
    /// Gap between tables, both within a column and between columns.
    pub table_gutter: f64,
    /// How far an indirect (C-shaped) curve loops past the rightmost edge.
    pub loop_offset: f64,
    /// Vertical distance at which direct-curve control points reach full
    /// pronouncement.
    pub curve_distance_max: f64,
    pub corner_radius: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            row_width: 230.0,
            row_height: 22.0,
            table_gutter: 40.0,
            loop_offset: 40.0,
            curve_distance_max: 300.0,
            corner_radius: 4.0,
        }
    }
}

impl Metrics {
    /// Header row plus one row per field.
    pub fn table_height(&self, field_count: usize) -> f64 {
        (field_count as f64 + 1.0) * self.row_height
    }

    /// Vertical space a table consumes in a column, gutter included.
    pub fn slot_height(&self, field_count: usize) -> f64 {
        self.table_height(field_count) + self.table_gutter
    }

    pub fn column_x(&self, column: usize) -> f64 {
        column as f64 * (self.row_width + self.table_gutter)
    }

    /// Vertical center of a row. Row 0 is the table header.
    pub fn row_center_y(&self, table_y: f64, row: usize) -> f64 {
        table_y + row as f64 * self.row_height + self.row_height / 2.0
    }
}

/// Cubic bezier path: start, two control points, end.
pub fn link_path(start: (f64, f64), c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) -> String {
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        start.0, start.1, c1.0, c1.1, c2.0, c2.1, end.0, end.1
    )
}

/// Rounded rectangle outline for a table background.
pub fn table_body_path(x: f64, y: f64, width: f64, height: f64, radius: f64) -> String {
    let r = radius.min(width / 2.0).min(height / 2.0);
    format!(
        "M {} {} h {} a {r} {r} 0 0 1 {r} {r} v {} a {r} {r} 0 0 1 -{r} {r} h -{} a {r} {r} 0 0 1 -{r} -{r} v -{} a {r} {r} 0 0 1 {r} -{r} z",
        x + r,
        y,
        width - 2.0 * r,
        height - 2.0 * r,
        width - 2.0 * r,
        height - 2.0 * r,
    )
}

/// Header strip: rounded on top, square where it meets the field rows.
pub fn table_header_path(x: f64, y: f64, width: f64, row_height: f64, radius: f64) -> String {
    let r = radius.min(width / 2.0).min(row_height);
    format!(
        "M {} {} v -{} a {r} {r} 0 0 1 {r} -{r} h {} a {r} {r} 0 0 1 {r} {r} v {} z",
        x,
        y + row_height,
        row_height - r,
        width - 2.0 * r,
        row_height - r,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_height_counts_header_row() {
        let m = Metrics::default();
        assert_eq!(m.table_height(0), m.row_height);
        assert_eq!(m.table_height(3), 4.0 * m.row_height);
    }

    #[test]
    fn test_row_center_y() {
        let m = Metrics::default();
        assert_eq!(m.row_center_y(100.0, 0), 100.0 + m.row_height / 2.0);
        assert_eq!(m.row_center_y(100.0, 2), 100.0 + 2.5 * m.row_height);
    }

    #[test]
    fn test_column_x_spacing() {
        let m = Metrics::default();
        assert_eq!(m.column_x(0), 0.0);
        assert_eq!(m.column_x(2), 2.0 * (m.row_width + m.table_gutter));
    }

    #[test]
    fn test_link_path_format() {
        let path = link_path((0.0, 0.0), (150.0, 0.0), (150.0, 0.0), (300.0, 0.0));
        assert_eq!(path, "M 0 0 C 150 0, 150 0, 300 0");
    }

    #[test]
    fn test_body_path_is_closed() {
        let path = table_body_path(10.0, 20.0, 230.0, 88.0, 4.0);
        assert!(path.starts_with("M 14 20"));
        assert!(path.ends_with('z'));
    }

    #[test]
    fn test_header_path_is_closed() {
        let path = table_header_path(0.0, 0.0, 230.0, 22.0, 4.0);
        assert!(path.starts_with("M 0 22"));
        assert!(path.ends_with('z'));
    }
}
