//! 相机位姿表.
//!
//! 对应磁盘上每个场景的 nerfstudio `transforms.json`: 图像文件名到 4×4
//! 相机变换矩阵的映射.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Deserialize;

/// 4×4 相机变换矩阵的行优先存储.
type Matrix4 = [[f64; 4]; 4];

/// `transforms.json` 中的一帧.
#[derive(Debug, Deserialize)]
struct Frame {
    file_path: String,
    transform_matrix: Matrix4,
}

/// `transforms.json` 的顶层结构. 只反序列化需要的字段.
#[derive(Debug, Deserialize)]
struct Transforms {
    #[serde(default)]
    frames: Vec<Frame>,
}

/// 打开位姿表错误.
#[derive(Debug)]
pub enum PoseError {
    /// 位姿表文件不存在.
    NotFound(PathBuf),

    /// 其他底层 I/O 错误.
    IoError(std::io::Error),

    /// json 解析错误.
    JsonError(serde_json::Error),
}

/// 一个场景的相机位姿表.
///
/// 查询以图像文件主干名 (去目录、去扩展名) 为键, 因此
/// `dslr/resized_images/DSC00633.JPG` 和 `DSC00633.jpg`
/// 都能命中主干名 `DSC00633`.
#[derive(Debug, Clone)]
pub struct PoseTable {
    frames: Vec<(String, Matrix4)>,
}

impl PoseTable {
    /// 从 `transforms.json` 读取位姿表.
    ///
    /// 文件不存在时返回 [`PoseError::NotFound`]; 调用方应降级为
    /// "该场景所有样本均无位姿", 而不是中断处理.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<PoseTable, PoseError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PoseError::NotFound(path.to_owned()));
        }
        let content = fs::read_to_string(path).map_err(PoseError::IoError)?;
        Self::from_json_str(&content).map_err(PoseError::JsonError)
    }

    /// 从 json 字符串解析位姿表.
    pub fn from_json_str(content: &str) -> Result<PoseTable, serde_json::Error> {
        let transforms: Transforms = serde_json::from_str(content)?;
        let frames = transforms
            .frames
            .into_iter()
            .filter_map(|f| {
                let stem = Path::new(&f.file_path)
                    .file_stem()
                    .and_then(|s| s.to_str())?
                    .to_owned();
                Some((stem, f.transform_matrix))
            })
            .collect();
        Ok(PoseTable { frames })
    }

    /// 查询主干名为 `stem` 的图像的相机位姿.
    pub fn pose_for(&self, stem: &str) -> Option<Array2<f64>> {
        self.frames
            .iter()
            .find(|(s, _)| s == stem)
            .map(|(_, m)| Array2::from_shape_fn((4, 4), |(i, j)| m[i][j]))
    }

    /// 位姿个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// 位姿表是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "fl_x": 1000.0,
        "frames": [
            {
                "file_path": "dslr/resized_images/DSC00633.JPG",
                "transform_matrix": [
                    [1.0, 0.0, 0.0, 0.5],
                    [0.0, 1.0, 0.0, 1.5],
                    [0.0, 0.0, 1.0, 2.5],
                    [0.0, 0.0, 0.0, 1.0]
                ]
            },
            {
                "file_path": "frame_000123.jpg",
                "transform_matrix": [
                    [0.0, 1.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0, 1.0]
                ]
            }
        ]
    }"#;

    #[test]
    fn test_lookup_by_stem() {
        let table = PoseTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);

        let pose = table.pose_for("DSC00633").unwrap();
        assert_eq!(pose.shape(), [4, 4]);
        assert_eq!(pose[(0, 3)], 0.5);
        assert_eq!(pose[(2, 3)], 2.5);

        assert!(table.pose_for("frame_000123").is_some());
        assert!(table.pose_for("DSC09999").is_none());
    }

    #[test]
    fn test_missing_frames_is_empty() {
        let table = PoseTable::from_json_str("{}").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("transforms.json");
        match PoseTable::open(&missing) {
            Err(PoseError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("期望 NotFound, 实际为 {other:?}"),
        }
    }
}
