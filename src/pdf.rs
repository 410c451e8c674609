use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No PDF renderer found (install wkhtmltopdf or chromium)")]
    NoRendererAvailable,

    #[error("Could not run {renderer}: {source}")]
    Spawn {
        renderer: Renderer,
        source: io::Error,
    },

    #[error("{renderer} exited with {status}")]
    Failed {
        renderer: Renderer,
        status: ExitStatus,
    },
}

/// HTML to PDF converters, in order of preference.
#[derive(Display, EnumIter, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Renderer {
    #[strum(serialize = "wkhtmltopdf")]
    Wkhtmltopdf,
    #[strum(serialize = "chromium")]
    Chromium,
    #[strum(serialize = "chromium-browser")]
    ChromiumBrowser,
    #[strum(serialize = "google-chrome")]
    GoogleChrome,
    #[strum(serialize = "google-chrome-stable")]
    GoogleChromeStable,
}

impl Renderer {
    pub fn args(&self, html: &Path, pdf: &Path) -> Vec<OsString> {
        match self {
            Renderer::Wkhtmltopdf => vec![html.into(), pdf.into()],
            _ => {
                let mut print_to = OsString::from("--print-to-pdf=");
                print_to.push(pdf);
                let mut url = OsString::from("file://");
                url.push(html);
                vec![
                    "--headless".into(),
                    "--disable-gpu".into(),
                    "--no-sandbox".into(),
                    print_to,
                    url,
                ]
            }
        }
    }
}

/// The first renderer with an executable in `search_path`.
pub fn find_renderer(search_path: &OsStr) -> Option<(Renderer, PathBuf)> {
    Renderer::iter().find_map(|renderer| {
        env::split_paths(search_path)
            .map(|dir| dir.join(renderer.to_string()))
            .find(|candidate| is_executable(candidate))
            .map(|program| (renderer, program))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Convert `html` to `pdf` with the first renderer found in `search_path`.
pub fn convert_with(
    search_path: &OsStr,
    html: &Path,
    pdf: &Path,
) -> Result<Renderer, RenderError> {
    let (renderer, program) =
        find_renderer(search_path).ok_or(RenderError::NoRendererAvailable)?;

    info!("converting {} with {}", html.display(), program.display());
    let status = Command::new(&program)
        .args(renderer.args(html, pdf))
        .status()
        .map_err(|source| RenderError::Spawn { renderer, source })?;

    if !status.success() {
        return Err(RenderError::Failed { renderer, status });
    }
    Ok(renderer)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn install(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn preference_order() {
        let names: Vec<String> = Renderer::iter().map(|r| r.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "wkhtmltopdf",
                "chromium",
                "chromium-browser",
                "google-chrome",
                "google-chrome-stable"
            ]
        );
    }

    #[test]
    fn prefers_wkhtmltopdf() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        install(first.path(), "google-chrome", 0o755);
        install(second.path(), "wkhtmltopdf", 0o755);

        let search =
            env::join_paths([first.path(), second.path()]).unwrap();
        let (renderer, program) = find_renderer(&search).unwrap();
        assert_eq!(renderer, Renderer::Wkhtmltopdf);
        assert_eq!(program, second.path().join("wkhtmltopdf"));
    }

    #[test]
    fn falls_back_to_browsers() {
        let dir = tempdir().unwrap();
        install(dir.path(), "chromium-browser", 0o755);
        install(dir.path(), "google-chrome-stable", 0o755);

        let (renderer, _) = find_renderer(dir.path().as_os_str()).unwrap();
        assert_eq!(renderer, Renderer::ChromiumBrowser);
    }

    #[test]
    fn skips_non_executables() {
        let dir = tempdir().unwrap();
        install(dir.path(), "wkhtmltopdf", 0o644);
        install(dir.path(), "chromium", 0o755);

        let (renderer, _) = find_renderer(dir.path().as_os_str()).unwrap();
        assert_eq!(renderer, Renderer::Chromium);
    }

    #[test]
    fn no_renderer_available() {
        let dir = tempdir().unwrap();
        let html = dir.path().join("invoice.html");
        let pdf = dir.path().join("invoice.pdf");
        assert!(matches!(
            convert_with(dir.path().as_os_str(), &html, &pdf),
            Err(RenderError::NoRendererAvailable)
        ));
    }

    #[test]
    fn renderer_arguments() {
        let html = Path::new("/out/invoice.html");
        let pdf = Path::new("/out/invoice.pdf");
        assert_eq!(
            Renderer::Wkhtmltopdf.args(html, pdf),
            vec![OsString::from("/out/invoice.html"), "/out/invoice.pdf".into()]
        );
        let chrome = Renderer::GoogleChrome.args(html, pdf);
        assert_eq!(chrome[3], OsString::from("--print-to-pdf=/out/invoice.pdf"));
        assert_eq!(chrome[4], OsString::from("file:///out/invoice.html"));
    }
}
