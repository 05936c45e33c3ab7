//! 文件签名识别
//!
//! 每个加载器只处理自己认识的签名，识别不依赖扩展名。

use image::ImageFormat;

/// 解码器支持的格式，顺序即尝试顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Gif,
    Still,
    Archive,
    Video,
}

impl Format {
    /// 加载器的尝试顺序
    pub const PRIORITY: [Format; 4] = [Format::Gif, Format::Still, Format::Archive, Format::Video];

    pub fn name(self) -> &'static str {
        match self {
            Format::Gif => "gif",
            Format::Still => "still",
            Format::Archive => "archive",
            Format::Video => "video",
        }
    }

    /// 文件头是否属于该格式
    pub fn recognizes(self, bytes: &[u8]) -> bool {
        match self {
            Format::Gif => is_gif(bytes),
            Format::Still => is_still_image(bytes),
            Format::Archive => is_zip(bytes),
            Format::Video => is_video(bytes),
        }
    }
}

/// 识别出的全部候选格式（按尝试顺序）
pub fn candidates(bytes: &[u8]) -> Vec<Format> {
    Format::PRIORITY
        .into_iter()
        .filter(|f| f.recognizes(bytes))
        .collect()
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

fn is_still_image(bytes: &[u8]) -> bool {
    matches!(
        image::guess_format(bytes),
        Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)
    )
}

fn is_zip(bytes: &[u8]) -> bool {
    // 普通归档 / 空归档
    bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06")
}

fn is_video(bytes: &[u8]) -> bool {
    // ISO-BMFF (mp4/mov)：第 4 字节起为 ftyp
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return true;
    }
    // Matroska / WebM
    if bytes.starts_with(&[0x1a, 0x45, 0xdf, 0xa3]) {
        return true;
    }
    // AVI
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"AVI " {
        return true;
    }
    // Ogg / FLV
    if bytes.starts_with(b"OggS") || bytes.starts_with(b"FLV") {
        return true;
    }
    // MPEG-PS
    if bytes.starts_with(&[0x00, 0x00, 0x01, 0xba]) {
        return true;
    }
    // MPEG-TS：188 字节包，每包以 0x47 开头
    bytes.len() >= 189 && bytes[0] == 0x47 && bytes[188] == 0x47
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_signature() {
        assert_eq!(candidates(b"GIF89a\x01\x00"), vec![Format::Gif]);
        assert_eq!(candidates(b"GIF87a"), vec![Format::Gif]);
    }

    #[test]
    fn test_png_signature() {
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert_eq!(candidates(png), vec![Format::Still]);
    }

    #[test]
    fn test_zip_signature() {
        assert_eq!(candidates(b"PK\x03\x04rest"), vec![Format::Archive]);
        assert_eq!(candidates(b"PK\x05\x06"), vec![Format::Archive]);
    }

    #[test]
    fn test_video_signatures() {
        assert!(Format::Video.recognizes(b"\0\0\0\x20ftypisom"));
        assert!(Format::Video.recognizes(&[0x1a, 0x45, 0xdf, 0xa3, 0x01]));
        assert!(Format::Video.recognizes(b"RIFF\0\0\0\0AVI LIST"));
        assert!(!Format::Video.recognizes(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(Format::Video.recognizes(b"OggS\0"));

        let mut ts = vec![0u8; 200];
        ts[0] = 0x47;
        ts[188] = 0x47;
        assert!(Format::Video.recognizes(&ts));
    }

    #[test]
    fn test_unknown_bytes() {
        assert!(candidates(b"hello world").is_empty());
        assert!(candidates(&[]).is_empty());
    }
}
