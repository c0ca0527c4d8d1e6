use grayedit_texel::{PixelBuffer, Rgba};

#[test]
fn conversions() {
    let mut buffer = PixelBuffer::filled(4, 2, Rgba::new(1, 2, 3, 4));

    assert_eq!(buffer.as_bytes().len(), 32);
    assert_eq!(buffer.as_texels().len(), 8);
    assert_eq!(buffer.as_texels_mut().len(), 8);

    let bytes = buffer.as_bytes();
    assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    assert_eq!(Rgba::cast_slice(bytes)[7], Rgba::new(1, 2, 3, 4));
    assert_eq!(Rgba::to_bytes(buffer.as_texels()).len(), 32);
}

#[test]
fn channel_accessors() {
    let pixel = Rgba::opaque(10, 20, 30);
    assert_eq!((pixel.r(), pixel.g(), pixel.b(), pixel.a()), (10, 20, 30, 255));
    assert_eq!(pixel.rgb(), [10, 20, 30]);
    assert_eq!(pixel.with_alpha(7).a(), 7);
    assert!(pixel.is_opaque());
    assert!(!Rgba::gray(5, 254).is_opaque());
}
