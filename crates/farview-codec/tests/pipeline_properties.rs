//! Property tests for the encode/decode pipeline.

use farview_codec::{
    BufferFrame, DirtyRegion, PixelFormat, Rect, VideoDecoderZstd, VideoEncoderZstd,
};
use proptest::prelude::*;

const FRAME_SIZE: u32 = 32;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (0..FRAME_SIZE, 0..FRAME_SIZE).prop_flat_map(|(x, y)| {
        (1..=FRAME_SIZE - x, 1..=FRAME_SIZE - y)
            .prop_map(move |(width, height)| Rect::new(x, y, width, height))
    })
}

fn frame_with(region: DirtyRegion) -> BufferFrame {
    let mut data = Vec::with_capacity((FRAME_SIZE * FRAME_SIZE * 4) as usize);
    for y in 0..FRAME_SIZE {
        for x in 0..FRAME_SIZE {
            data.extend_from_slice(&[x as u8, y as u8, (x * 7 + y) as u8, 0xFF]);
        }
    }
    BufferFrame::packed_argb(FRAME_SIZE, FRAME_SIZE, data, region)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The decoded payload always matches the rectangle geometry, every
    /// rectangle comes back in order, and the pixel content agrees with
    /// the source frame.
    #[test]
    fn encode_decode_round_trip(rects in proptest::collection::vec(arb_rect(), 0..6)) {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();
        let mut decoder = VideoDecoderZstd::create().unwrap();

        let region: DirtyRegion = rects.iter().copied().collect();
        let frame = frame_with(region.clone());

        let packet = encoder.encode(&frame);
        prop_assert_eq!(packet.dirty_rects.len(), region.len());

        let updates = decoder.decode(&packet).unwrap();
        prop_assert_eq!(updates.len(), region.len());

        for (update, rect) in updates.iter().zip(region.iter()) {
            prop_assert_eq!(update.pixels.len(), rect.pixel_count() * 4);

            // Spot-check the rectangle's top-left pixel against the frame.
            let expected = [rect.x as u8, rect.y as u8, (rect.x * 7 + rect.y) as u8, 0xFF];
            prop_assert_eq!(&update.pixels[..4], &expected);
        }
    }
}
