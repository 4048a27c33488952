//! コンテナ定義ファイルの構造チェック
//!
//! Containerfile / Dockerfile を命令列に分解し、ビルド可能な最低限の
//! 構造を持っているかを確認します。行継続 (`\`) とコメントに対応。

use crate::check::{CheckContext, CheckKind, RequirementCheck};
use crate::error::{RequirementError, Result};
use async_trait::async_trait;
use carpenter_core::find_container_file;

const KNOWN_INSTRUCTIONS: [&str; 18] = [
    "ADD",
    "ARG",
    "CMD",
    "COPY",
    "ENTRYPOINT",
    "ENV",
    "EXPOSE",
    "FROM",
    "HEALTHCHECK",
    "LABEL",
    "MAINTAINER",
    "ONBUILD",
    "RUN",
    "SHELL",
    "STOPSIGNAL",
    "USER",
    "VOLUME",
    "WORKDIR",
];

/// 1つの命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 大文字化したキーワード
    pub keyword: String,
    pub args: String,
    /// 論理行の開始行番号 (1-origin)
    pub line: usize,
}

/// 命令列に分解する
pub fn parse_instructions(content: &str) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;

    for (idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();

        // コメント行と空行は継続中でも読み飛ばす
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }

        if current.is_empty() {
            start_line = idx + 1;
        }

        if let Some(body) = trimmed.strip_suffix('\\') {
            current.push_str(body.trim_end());
            current.push(' ');
            continue;
        }

        current.push_str(trimmed);
        push_instruction(&mut instructions, &current, start_line);
        current.clear();
    }

    if !current.trim().is_empty() {
        push_instruction(&mut instructions, &current, start_line);
    }

    instructions
}

fn push_instruction(instructions: &mut Vec<Instruction>, logical: &str, line: usize) {
    let logical = logical.trim();
    let (keyword, args) = match logical.split_once(char::is_whitespace) {
        Some((keyword, args)) => (keyword, args.trim()),
        None => (logical, ""),
    };
    instructions.push(Instruction {
        keyword: keyword.to_ascii_uppercase(),
        args: args.to_string(),
        line,
    });
}

/// 構造上の問題を列挙する
pub fn structural_problems(instructions: &[Instruction]) -> Vec<String> {
    let mut problems = Vec::new();

    if instructions.is_empty() {
        problems.push("命令が1つもありません".to_string());
        return problems;
    }

    // FROM より前に置けるのは ARG のみ
    match instructions.iter().find(|i| i.keyword != "ARG") {
        Some(first) if first.keyword == "FROM" => {}
        Some(first) => problems.push(format!(
            "最初の命令は FROM である必要があります (line {}: {})",
            first.line, first.keyword
        )),
        None => problems.push("FROM 命令がありません".to_string()),
    }

    for ins in instructions {
        if !KNOWN_INSTRUCTIONS.contains(&ins.keyword.as_str()) {
            problems.push(format!("不明な命令です (line {}): {}", ins.line, ins.keyword));
        }
        if ins.keyword == "FROM" && ins.args.is_empty() {
            problems.push(format!("FROM にベースイメージがありません (line {})", ins.line));
        }
    }

    if !instructions
        .iter()
        .any(|i| i.keyword == "CMD" || i.keyword == "ENTRYPOINT")
    {
        problems.push("CMD または ENTRYPOINT がありません".to_string());
    }

    problems
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerfileRequirements;

impl ContainerfileRequirements {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequirementCheck for ContainerfileRequirements {
    fn kind(&self) -> CheckKind {
        CheckKind::ContainerDefinition
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<bool> {
        let Some(path) = find_container_file(ctx.project_path) else {
            tracing::warn!(
                "[{}] No Containerfile or Dockerfile in {}",
                ctx.image,
                ctx.project_path.display()
            );
            return Ok(false);
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RequirementError::Io {
                path: path.clone(),
                source,
            })?;

        let instructions = parse_instructions(&content);
        tracing::debug!(
            "Parsed {} instructions from {}",
            instructions.len(),
            path.display()
        );

        let problems = structural_problems(&instructions);
        for problem in &problems {
            tracing::warn!("[{}] {}: {}", ctx.image, path.display(), problem);
        }
        Ok(problems.is_empty())
    }
}
