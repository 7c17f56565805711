//! FFmpeg filter graphs.

/// Vertical reel with a blurred background.
///
/// Center-crops the source to 4:3, scales it to 1080 wide, and overlays it
/// on a 1080x1920 box-blurred copy of itself.
pub const FILTER_REEL_VERTICAL_BLUR: &str = concat!(
    "[0:v]crop=ih*4/3:ih:(iw-ih*4/3)/2:0,scale=1080:-1[cropped];",
    "[cropped]scale=-1:1920,",
    "boxblur=luma_radius=min(h\\,w)/40:luma_power=3:chroma_radius=min(cw\\,ch)/40:chroma_power=1[bg];",
    "[bg][cropped]overlay=(W-w)/2:(H-h)/2,setsar=1,crop=w=1080:h=1920"
);

/// Output dimensions of the reel graph.
pub const REEL_WIDTH: u32 = 1080;
pub const REEL_HEIGHT: u32 = 1920;
