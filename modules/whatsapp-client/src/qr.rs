use qrcode::render::unicode;
use qrcode::QrCode;

/// Render a pairing code as a block-character QR code for the terminal.
/// `None` if the value does not fit in a QR code.
pub fn render(value: &str) -> Option<String> {
    let code = QrCode::new(value.as_bytes()).ok()?;
    Some(
        code.render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build(),
    )
}
