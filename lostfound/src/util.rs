use std::path::{Path, PathBuf};

/// 워크스페이스 디렉토리를 반환하는 함수입니다.
///
/// # 주의
/// 빌드 시점의 `CARGO_MANIFEST_DIR` 상위 경로이므로 배포된 바이너리에서는
/// 실제 작업 디렉토리와 다를 수 있습니다.
pub fn workspace_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}
