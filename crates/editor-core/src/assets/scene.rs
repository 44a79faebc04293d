use serde::{Deserialize, Serialize};

use crate::components::Transform;

/// シーンアセット（`.scene`）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneAsset {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

/// シーン内のオブジェクト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
}

impl SceneAsset {
    /// 名前でオブジェクトを検索
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_parse_scene() {
        let json = r#"{
            "name": "Main",
            "objects": [
                { "name": "Crate", "transform": { "position": [5.0, 0.0, 0.0] } },
                { "name": "Light" }
            ]
        }"#;
        let scene: SceneAsset = serde_json::from_str(json).unwrap();
        assert_eq!(scene.name, "Main");
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.find("Crate").unwrap().transform.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(scene.find("Light").unwrap().transform, Transform::identity());
        assert!(scene.find("Camera").is_none());
    }
}
