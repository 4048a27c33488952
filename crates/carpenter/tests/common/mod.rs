use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    /// 要件をすべて満たす Go プロジェクト
    #[allow(dead_code)]
    pub fn go_plugin() -> Self {
        let project = Self::new();
        project.write_file("README.md", "# example plugin\n");
        project.write_file("LICENSE", "Apache License 2.0\n");
        project.write_file(
            "Containerfile",
            "FROM golang:1.22 AS build\nCOPY . /src\nRUN go build -o /plugin ./...\n\nFROM alpine\nCOPY --from=build /plugin /plugin\nENTRYPOINT [\"/plugin\"]\n",
        );
        project.write_file("go.mod", "module example.com/plugin\n\ngo 1.22\n");
        project.write_file("go.sum", "");
        project
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.root.path().join(name), content).unwrap();
    }

    /// carpenter.yaml を書き出し、そのパスを返す
    #[allow(dead_code)]
    pub fn write_config(&self, image_name: &str, image_tag: &str) -> PathBuf {
        let content = format!(
            r#"project_filepath: {}
image_name: {}
image_tag: "{}"
quay_img_exp: "1d"
registries:
  - url: quay.io
    namespace: arcalot
    username_envvar: CARPENTER_TEST_USERNAME
    password_envvar: CARPENTER_TEST_PASSWORD
"#,
            self.path().display(),
            image_name,
            image_tag
        );
        let path = self.path().join("carpenter.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}
