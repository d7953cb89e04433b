// Static asset links: Google Drive share links rewritten into thumbnail and
// download URLs, plus the load state of certificate/profile images.

const DRIVE_HOST: &str = "drive.google.com";

/// File id of a Google Drive share link, if it is one.
///
/// Handles `/file/d/<id>/view`, `open?id=<id>` and `uc?id=<id>` forms.
pub fn drive_file_id(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let path = rest.strip_prefix(DRIVE_HOST)?;

    if let Some(start) = path.find("/file/d/") {
        let id = &path[start + "/file/d/".len()..];
        let end = id.find(|c: char| c == '/' || c == '?' || c == '#').unwrap_or(id.len());
        return non_empty(&id[..end]);
    }

    let query = &path[path.find('?')? + 1..];
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .map(|id| id.split('#').next().unwrap_or(id))
        .and_then(non_empty)
}

fn non_empty(id: &str) -> Option<&str> {
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Thumbnail URL for a Drive link at the given pixel width; other URLs are
/// returned unchanged.
pub fn drive_thumbnail_url(url: &str, width: u32) -> String {
    match drive_file_id(url) {
        Some(id) => format!("https://{}/thumbnail?id={}&sz=w{}", DRIVE_HOST, id, width),
        None => url.to_owned(),
    }
}

pub fn drive_download_url(url: &str) -> String {
    match drive_file_id(url) {
        Some(id) => format!("https://{}/uc?export=download&id={}", DRIVE_HOST, id),
        None => url.to_owned(),
    }
}

pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Loading(String),
    Loaded(String),
    Failed,
}

impl ImageState {
    pub fn new(src: &str) -> ImageState {
        ImageState::Loading(src.to_owned())
    }

    pub fn on_load(&mut self) {
        if let ImageState::Loading(src) = self {
            let src = std::mem::take(src);
            *self = ImageState::Loaded(src);
        }
    }

    pub fn on_error(&mut self) {
        log::warn!("image failed to load, showing placeholder: {:?}", self.requested());
        *self = ImageState::Failed;
    }

    fn requested(&self) -> Option<&str> {
        match self {
            ImageState::Loading(src) | ImageState::Loaded(src) => Some(src),
            ImageState::Failed => None,
        }
    }

    /// What the `<img>` should point at right now.
    pub fn display_src(&self) -> &str {
        match self {
            ImageState::Loading(src) | ImageState::Loaded(src) => src,
            ImageState::Failed => PLACEHOLDER_IMAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_d_links() {
        let url = "https://drive.google.com/file/d/1AbC-xyz_9/view?usp=sharing";
        assert_eq!(drive_file_id(url), Some("1AbC-xyz_9"));
        assert_eq!(
            drive_thumbnail_url(url, 800),
            "https://drive.google.com/thumbnail?id=1AbC-xyz_9&sz=w800"
        );
        assert_eq!(drive_file_id("https://drive.google.com/file/d/abc"), Some("abc"));
    }

    #[test]
    fn query_id_links() {
        assert_eq!(drive_file_id("https://drive.google.com/open?id=XYZ"), Some("XYZ"));
        assert_eq!(drive_file_id("https://drive.google.com/uc?export=view&id=XYZ#frag"), Some("XYZ"));
        assert_eq!(
            drive_download_url("http://drive.google.com/open?id=Q1"),
            "https://drive.google.com/uc?export=download&id=Q1"
        );
    }

    #[test]
    fn non_drive_urls_pass_through() {
        assert_eq!(drive_file_id("https://example.com/file/d/abc/view"), None);
        assert_eq!(drive_file_id("https://drive.google.com/file/d//view"), None);
        assert_eq!(drive_file_id("https://drive.google.com/drive/folders"), None);
        assert_eq!(drive_thumbnail_url("/images/me.jpg", 400), "/images/me.jpg");
    }

    #[test]
    fn image_falls_back_to_placeholder() {
        let mut image = ImageState::new("/certs/aws.png");
        assert_eq!(image.display_src(), "/certs/aws.png");
        image.on_load();
        assert_eq!(image, ImageState::Loaded("/certs/aws.png".into()));
        image.on_error();
        assert_eq!(image.display_src(), PLACEHOLDER_IMAGE);
    }
}
