//! CSV table parsing shared by labelled and unlabelled inputs.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use pose_types::{JointCoordinate, NUM_JOINTS, Skeleton};
use tracing::debug;

use crate::error::{DataError, Result};

/// Name prefix that marks a column as a CSI feature.
pub const FEATURE_PREFIX: &str = "csi_";

/// Column holding the presence label.
pub const PRESENCE_COLUMN: &str = "human_presence";

/// Column holding the pose-class label.
pub const POSE_COLUMN: &str = "pose_class";

/// Returns the `(x, y)` column names for joint `index`.
///
/// # Example
///
/// ```
/// use pose_dataset::joint_column;
///
/// assert_eq!(joint_column(3), ("joint_3_x".to_string(), "joint_3_y".to_string()));
/// ```
#[must_use]
pub fn joint_column(index: usize) -> (String, String) {
    (format!("joint_{index}_x"), format!("joint_{index}_y"))
}

/// A parsed CSV: header plus raw records.
pub(crate) struct RawTable {
    pub(crate) headers: Vec<String>,
    pub(crate) records: Vec<csv::StringRecord>,
}

impl RawTable {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| DataError::io(path.display().to_string(), e.to_string()))?;
        Self::read(file)
    }

    pub(crate) fn read<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        if records.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        Ok(Self { headers, records })
    }

    pub(crate) fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub(crate) fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| DataError::missing_column(name))
    }

    /// Indices of every feature column, in table order.
    pub(crate) fn feature_columns(&self) -> Result<Vec<usize>> {
        let columns: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(FEATURE_PREFIX))
            .map(|(i, _)| i)
            .collect();
        if columns.is_empty() {
            return Err(DataError::NoFeatureColumns {
                prefix: FEATURE_PREFIX,
            });
        }
        Ok(columns)
    }

    pub(crate) fn cell(&self, row: usize, column: usize) -> &str {
        self.records[row].get(column).unwrap_or("")
    }

    pub(crate) fn float(&self, row: usize, column: usize) -> Result<f32> {
        let cell = self.cell(row, column);
        cell.parse::<f32>().map_err(|_| {
            DataError::invalid_cell(row, &self.headers[column], format!("`{cell}` is not a number"))
        })
    }

    pub(crate) fn flag(&self, row: usize, column: usize) -> Result<bool> {
        let cell = self.cell(row, column);
        match cell.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" => Ok(true),
            "0" | "0.0" | "false" => Ok(false),
            _ => Err(DataError::invalid_cell(
                row,
                &self.headers[column],
                format!("`{cell}` is not a presence flag"),
            )),
        }
    }

    pub(crate) fn features(&self, columns: &[usize]) -> Result<Vec<Vec<f32>>> {
        (0..self.records.len())
            .map(|row| columns.iter().map(|&c| self.float(row, c)).collect())
            .collect()
    }

    pub(crate) fn feature_names(&self, columns: &[usize]) -> Vec<String> {
        columns.iter().map(|&c| self.headers[c].clone()).collect()
    }
}

/// Unlabelled inference input.
///
/// Carries the `csi_` features of each row and, when the table has all 34
/// `joint_{i}_x` / `joint_{i}_y` columns, each row's skeleton.
///
/// # Example
///
/// ```
/// use pose_dataset::FeatureTable;
///
/// let table = FeatureTable::from_reader("csi_0,csi_1\n0.5,0.25\n".as_bytes()).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.row(0), Some(&[0.5, 0.25][..]));
/// assert!(table.skeleton(0).is_zeroed());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    rows: Vec<Vec<f32>>,
    skeletons: Option<Vec<Skeleton>>,
}

impl FeatureTable {
    /// Loads a table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the file is unreadable, has no rows or
    /// feature columns, or holds a non-numeric cell.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_raw(&RawTable::open(path)?)?;
        debug!(path = %path.display(), rows = table.len(), "loaded feature table");
        Ok(table)
    }

    /// Loads a table from any CSV reader.
    ///
    /// # Errors
    ///
    /// See [`FeatureTable::load`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(&RawTable::read(reader)?)
    }

    /// Builds a table directly from feature rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyDataset`] for no rows and
    /// [`DataError::InconsistentWidth`] for ragged rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).ok_or(DataError::EmptyDataset)?;
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DataError::InconsistentWidth {
                index,
                expected: width,
                actual: row.len(),
            });
        }
        Ok(Self {
            feature_names: (0..width).map(|i| format!("{FEATURE_PREFIX}{i}")).collect(),
            rows,
            skeletons: None,
        })
    }

    fn from_raw(raw: &RawTable) -> Result<Self> {
        let columns = raw.feature_columns()?;
        let rows = raw.features(&columns)?;
        let skeletons = Self::read_skeletons(raw)?;
        Ok(Self {
            feature_names: raw.feature_names(&columns),
            rows,
            skeletons,
        })
    }

    fn read_skeletons(raw: &RawTable) -> Result<Option<Vec<Skeleton>>> {
        let mut pairs = Vec::with_capacity(NUM_JOINTS);
        for i in 0..NUM_JOINTS {
            let (x, y) = joint_column(i);
            match (raw.column(&x), raw.column(&y)) {
                (Some(x), Some(y)) => pairs.push((x, y)),
                _ => return Ok(None),
            }
        }

        let mut skeletons = Vec::with_capacity(raw.records.len());
        for row in 0..raw.records.len() {
            let joints = pairs
                .iter()
                .map(|&(x, y)| Ok(JointCoordinate::new(raw.float(row, x)?, raw.float(row, y)?)))
                .collect::<Result<Vec<_>>>()?;
            skeletons.push(Skeleton::from_joints(joints).unwrap_or_default());
        }
        Ok(Some(skeletons))
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of feature columns.
    #[must_use]
    pub fn feature_width(&self) -> usize {
        self.feature_names.len()
    }

    /// Returns the feature column names in table order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Returns the features of one row.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Returns every row's features.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Returns the skeleton for a row, zeroed when the table has no joints.
    #[must_use]
    pub fn skeleton(&self, index: usize) -> Skeleton {
        self.skeletons
            .as_ref()
            .and_then(|s| s.get(index))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn joint_header() -> String {
        (0..NUM_JOINTS)
            .map(|i| {
                let (x, y) = joint_column(i);
                format!("{x},{y}")
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn feature_columns_keep_table_order() {
        let csv = "csi_2,other,csi_0\n1,x,2\n";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.feature_names(), ["csi_2", "csi_0"]);
        assert_eq!(table.row(0).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn no_feature_columns() {
        let err = FeatureTable::from_reader("a,b\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NoFeatureColumns { .. }));
    }

    #[test]
    fn header_only_is_empty() {
        let err = FeatureTable::from_reader("csi_0,csi_1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset));
    }

    #[test]
    fn non_numeric_feature() {
        let err = FeatureTable::from_reader("csi_0,csi_1\n0.1,abc\n".as_bytes()).unwrap_err();
        match err {
            DataError::InvalidCell { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "csi_1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_record_is_csv_error() {
        let err = FeatureTable::from_reader("csi_0,csi_1\n0.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn joints_read_when_all_columns_present() {
        let values: Vec<String> = (0..NUM_JOINTS * 2).map(|v| v.to_string()).collect();
        let csv = format!("csi_0,{}\n0.5,{}\n", joint_header(), values.join(","));
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();

        let skeleton = table.skeleton(0);
        assert_eq!(skeleton.joints()[0], JointCoordinate::new(0.0, 1.0));
        assert_eq!(skeleton.joints()[16], JointCoordinate::new(32.0, 33.0));
    }

    #[test]
    fn partial_joint_columns_are_ignored() {
        let csv = "csi_0,joint_0_x,joint_0_y\n1,2,3\n";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        assert!(table.skeleton(0).is_zeroed());
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = FeatureTable::from_rows(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, DataError::InconsistentWidth { index: 1, .. }));
        assert!(matches!(
            FeatureTable::from_rows(Vec::new()).unwrap_err(),
            DataError::EmptyDataset
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FeatureTable::load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
