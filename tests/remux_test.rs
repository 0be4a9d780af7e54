#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use futures::stream;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use tsremux::codec::h264::AUD_NALU;
    use tsremux::format::ts::{Frame, StreamKind, PID_AUDIO, PID_PAT, PID_PMT, PID_VIDEO, TS_PACKET_SIZE};
    use tsremux::utils::Crc32Mpeg2;
    use tsremux::{pipeline, RemuxConfig, RemuxObserver, RtmpMsg, TsRemuxer};

    const SPS: [u8; 9] = [0x67, 0x42, 0x00, 0x28, 0xf4, 0x02, 0x80, 0x2d, 0xc8];
    const PPS: [u8; 4] = [0x68, 0xce, 0x3c, 0x80];
    const ASC: [u8; 2] = [0x12, 0x10];

    #[derive(Debug, Clone)]
    struct Emitted {
        frame: Frame,
        boundary: bool,
        packets: Vec<u8>,
    }

    #[derive(Debug, Default)]
    struct Recorder {
        pat_pmt: Vec<Vec<u8>>,
        emitted: Vec<Emitted>,
    }

    impl RemuxObserver for Recorder {
        fn on_pat_pmt(&mut self, pat_pmt: &[u8]) {
            self.pat_pmt.push(pat_pmt.to_vec());
        }

        fn on_ts_packets(&mut self, _: &mut TsRemuxer, ts_packets: &[u8], frame: &Frame, boundary: bool) {
            self.emitted.push(Emitted {
                frame: frame.clone(),
                boundary,
                packets: ts_packets.to_vec(),
            });
        }
    }

    /// Shares its log with the test while the remuxer runs on a tokio task.
    #[derive(Clone, Default)]
    struct SharedRecorder(Arc<Mutex<Recorder>>);

    impl RemuxObserver for SharedRecorder {
        fn on_pat_pmt(&mut self, pat_pmt: &[u8]) {
            self.0.lock().on_pat_pmt(pat_pmt);
        }

        fn on_ts_packets(&mut self, remuxer: &mut TsRemuxer, ts_packets: &[u8], frame: &Frame, boundary: bool) {
            self.0.lock().on_ts_packets(remuxer, ts_packets, frame, boundary);
        }
    }

    fn avc_seq_header() -> RtmpMsg {
        let mut payload = vec![0x17, 0x00, 0x00, 0x00, 0x00, 0x01, 0x42, 0x00, 0x28, 0xff, 0xe1];
        payload.extend_from_slice(&(SPS.len() as u16).to_be_bytes());
        payload.extend_from_slice(&SPS);
        payload.push(0x01);
        payload.extend_from_slice(&(PPS.len() as u16).to_be_bytes());
        payload.extend_from_slice(&PPS);
        RtmpMsg::video(0, payload)
    }

    fn aac_seq_header() -> RtmpMsg {
        let mut payload = vec![0xaf, 0x00];
        payload.extend_from_slice(&ASC);
        RtmpMsg::audio(0, payload)
    }

    fn video(ts: u32, key: bool, nals: &[&[u8]]) -> RtmpMsg {
        let mut payload = vec![if key { 0x17 } else { 0x27 }, 0x01, 0x00, 0x00, 0x00];
        for nal in nals {
            payload.extend_from_slice(&(nal.len() as u32).to_be_bytes());
            payload.extend_from_slice(nal);
        }
        RtmpMsg::video(ts, payload)
    }

    fn audio(ts: u32, raw: &[u8]) -> RtmpMsg {
        let mut payload = vec![0xaf, 0x01];
        payload.extend_from_slice(raw);
        RtmpMsg::audio(ts, payload)
    }

    fn param_sets() -> Vec<u8> {
        let mut out = vec![0x00, 0x00, 0x00, 0x01];
        out.extend_from_slice(&SPS);
        out.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        out.extend_from_slice(&PPS);
        out
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn packet_pid(packet: &[u8]) -> u16 {
        u16::from(packet[1] & 0x1f) << 8 | u16::from(packet[2])
    }

    /// Forces NAL body bytes away from zero so no start code can appear
    /// inside them.
    fn body(nal_type_header: u8, bytes: &[u8]) -> Vec<u8> {
        std::iter::once(nal_type_header)
            .chain(bytes.iter().take(64).map(|b| b | 0x01))
            .collect()
    }

    #[test]
    fn test_seq_header_then_idr() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();

        remuxer.on_ordered_message(&avc_seq_header(), &mut rec);
        remuxer.on_ordered_message(&video(0, true, &[&[0x65, 0x88, 0x84, 0x21]]), &mut rec);

        assert_eq!(rec.emitted.len(), 1);
        let emitted = &rec.emitted[0];
        assert!(emitted.boundary);
        assert!(emitted.frame.key);

        let mut expected = AUD_NALU.to_vec();
        expected.extend_from_slice(&param_sets());
        expected.extend_from_slice(&[0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x21]);
        assert_eq!(emitted.frame.raw, expected);
    }

    #[test]
    fn test_five_audio_frames_one_pes() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&aac_seq_header(), &mut rec);

        for i in 0..5u32 {
            remuxer.on_ordered_message(&audio(1000 + i * 20, &[0x21, 0x00, 0x49, 0x90]), &mut rec);
        }
        assert!(rec.emitted.is_empty());

        remuxer.on_ordered_message(&audio(1160, &[0x21, 0x00, 0x49, 0x90]), &mut rec);
        assert_eq!(rec.emitted.len(), 1);

        let frame = &rec.emitted[0].frame;
        assert_eq!(frame.stream, StreamKind::Audio);
        assert_eq!(frame.pts, 1000 * 90);
        assert_eq!(frame.dts, 1000 * 90);
        assert_eq!(frame.raw.len(), 5 * 11);
        assert_eq!(count(&frame.raw, &[0xff, 0xf1]), 5);
    }

    #[test]
    fn test_explicit_flush_before_threshold() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&aac_seq_header(), &mut rec);

        for i in 0..5u32 {
            remuxer.on_ordered_message(&audio(i * 20, &[0x21]), &mut rec);
        }
        remuxer.flush_audio(&mut rec);
        remuxer.flush_audio(&mut rec);

        assert_eq!(rec.emitted.len(), 1);
        assert_eq!(rec.emitted[0].frame.raw.len(), 5 * 8);
        assert!(remuxer.audio_cache_empty());
    }

    #[test]
    fn test_nothing_before_seq_headers() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();

        remuxer.on_ordered_message(&audio(0, &[0x21]), &mut rec);
        remuxer.on_ordered_message(&video(0, true, &[&[0x65, 0x01]]), &mut rec);
        remuxer.flush_audio(&mut rec);
        assert!(rec.emitted.is_empty());

        remuxer.on_ordered_message(&avc_seq_header(), &mut rec);
        remuxer.on_ordered_message(&video(40, true, &[&[0x65, 0x01]]), &mut rec);
        assert_eq!(rec.emitted.len(), 1);
    }

    #[test]
    fn test_continuity_counters_across_frames() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&avc_seq_header(), &mut rec);
        remuxer.on_ordered_message(&aac_seq_header(), &mut rec);

        let big: Vec<u8> = body(0x41, &[0x33; 64]).into_iter().cycle().take(3000).collect();
        for i in 0..40u32 {
            let nal: &[u8] = if i % 10 == 0 { &[0x65, 0x01] } else { &big };
            remuxer.on_ordered_message(&video(i * 40, i % 10 == 0, &[nal]), &mut rec);
            remuxer.on_ordered_message(&audio(i * 40 + 5, &[0x21, 0x10, 0x04]), &mut rec);
        }
        remuxer.flush_audio(&mut rec);

        let mut next_cc: HashMap<u16, u8> = HashMap::new();
        for emitted in &rec.emitted {
            assert_eq!(emitted.packets.len() % TS_PACKET_SIZE, 0);
            for packet in emitted.packets.chunks(TS_PACKET_SIZE) {
                assert_eq!(packet[0], 0x47);
                let pid = packet_pid(packet);
                let cc = packet[3] & 0x0f;
                if let Some(expected) = next_cc.get(&pid) {
                    assert_eq!(cc, *expected, "discontinuity on pid {:#x}", pid);
                }
                next_cc.insert(pid, (cc + 1) & 0x0f);
            }
            // the frame reports the counter its stream continues from
            assert_eq!(next_cc[&emitted.frame.pid()], emitted.frame.cc);
        }
        assert_eq!(next_cc.get(&PID_VIDEO).copied(), Some(remuxer.video_cc()));
        assert_eq!(next_cc.get(&PID_AUDIO).copied(), Some(remuxer.audio_cc()));
    }

    #[test]
    fn test_audio_only_stream_boundaries() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();

        remuxer.feed_rtmp_message(&aac_seq_header(), &mut rec);
        for i in 0..40u32 {
            remuxer.feed_rtmp_message(&audio(i * 23, &[0x21, 0x00]), &mut rec);
        }
        remuxer.finish(&mut rec);

        assert_eq!(rec.pat_pmt.len(), 1);
        assert!(!rec.emitted.is_empty());
        assert!(rec.emitted.iter().all(|e| e.boundary));
        // PCR rides on audio: the first packet of every frame carries one
        for emitted in &rec.emitted {
            assert_eq!(emitted.packets[5] & 0x10, 0x10);
        }
    }

    #[test]
    fn test_startup_filter_order_and_pat_pmt() {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();

        remuxer.feed_rtmp_message(&avc_seq_header(), &mut rec);
        remuxer.feed_rtmp_message(&video(0, true, &[&[0x65, 0x01]]), &mut rec);
        remuxer.feed_rtmp_message(&video(40, false, &[&[0x41, 0x01]]), &mut rec);
        assert!(rec.pat_pmt.is_empty());

        remuxer.feed_rtmp_message(&aac_seq_header(), &mut rec);
        remuxer.feed_rtmp_message(&audio(50, &[0x21]), &mut rec);
        remuxer.feed_rtmp_message(&video(80, false, &[&[0x41, 0x01]]), &mut rec);
        remuxer.finish(&mut rec);

        assert_eq!(rec.pat_pmt.len(), 1);
        let pat_pmt = &rec.pat_pmt[0];
        assert_eq!(pat_pmt.len(), 2 * TS_PACKET_SIZE);
        assert_eq!(packet_pid(&pat_pmt[..TS_PACKET_SIZE]), PID_PAT);
        assert_eq!(packet_pid(&pat_pmt[TS_PACKET_SIZE..]), PID_PMT);

        // each section checks out against its own CRC
        for packet in pat_pmt.chunks(TS_PACKET_SIZE) {
            let section_length = usize::from(packet[6] & 0x0f) << 8 | usize::from(packet[7]);
            assert_eq!(Crc32Mpeg2::calculate(&packet[5..8 + section_length]), 0);
        }

        let dts: Vec<(StreamKind, u64)> = rec
            .emitted
            .iter()
            .map(|e| (e.frame.stream, e.frame.dts))
            .collect();
        assert_eq!(
            dts,
            vec![
                (StreamKind::Video, 0),
                (StreamKind::Video, 40 * 90),
                (StreamKind::Video, 80 * 90),
                (StreamKind::Audio, 50 * 90),
            ]
        );
    }

    #[test]
    fn test_custom_config_thresholds() {
        let config = RemuxConfig {
            max_audio_cache_delay_by_audio: 20 * 90,
            ..Default::default()
        };
        let mut remuxer = TsRemuxer::new(config);
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&aac_seq_header(), &mut rec);

        for i in 0..4u32 {
            remuxer.on_ordered_message(&audio(i * 21, &[0x21]), &mut rec);
        }
        assert_eq!(rec.emitted.len(), 3);
    }

    #[test]
    fn test_pipeline_run_with_block_on() {
        let messages = vec![
            avc_seq_header(),
            aac_seq_header(),
            video(0, true, &[&[0x65, 0x01]]),
            audio(10, &[0x21]),
        ];
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();

        let consumed = tokio_test::block_on(pipeline::run(stream::iter(messages), &mut remuxer, &mut rec));

        assert_eq!(consumed, 4);
        assert_eq!(rec.pat_pmt.len(), 1);
        assert_eq!(rec.emitted.len(), 2);
        assert_eq!(rec.emitted[1].frame.stream, StreamKind::Audio);
    }

    #[tokio::test]
    async fn test_spawned_remuxers_are_independent() {
        let first = SharedRecorder::default();
        let second = SharedRecorder::default();

        let (tx1, h1) = pipeline::spawn(TsRemuxer::default(), first.clone(), 4);
        let (tx2, h2) = pipeline::spawn(TsRemuxer::default(), second.clone(), 4);

        tx1.send(avc_seq_header()).await.unwrap();
        tx2.send(aac_seq_header()).await.unwrap();
        for i in 0..3u32 {
            tx1.send(video(i * 40, i == 0, &[&[if i == 0 { 0x65 } else { 0x41 }, 0x01]]))
                .await
                .unwrap();
            tx2.send(audio(i * 23, &[0x21])).await.unwrap();
        }
        drop(tx1);
        drop(tx2);
        h1.await.unwrap();
        h2.await.unwrap();

        let first = first.0.lock();
        let second = second.0.lock();
        assert_eq!(first.pat_pmt.len(), 1);
        assert_eq!(second.pat_pmt.len(), 1);
        assert!(first.emitted.iter().all(|e| e.frame.stream == StreamKind::Video));
        assert_eq!(first.emitted.len(), 3);
        assert_eq!(second.emitted.len(), 1);
        assert_eq!(second.emitted[0].frame.raw.len(), 3 * 8);
    }

    #[quickcheck]
    fn prop_start_codes(bodies: Vec<Vec<u8>>) -> TestResult {
        if bodies.is_empty() {
            return TestResult::discard();
        }
        let nals: Vec<Vec<u8>> = bodies.iter().take(8).map(|b| body(0x41, b)).collect();
        let refs: Vec<&[u8]> = nals.iter().map(|n| n.as_slice()).collect();

        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&video(0, false, &refs), &mut rec);

        let mut expected = AUD_NALU.to_vec();
        for nal in &nals {
            expected.extend_from_slice(&[0x00, 0x00, 0x01]);
            expected.extend_from_slice(nal);
        }
        TestResult::from_bool(rec.emitted.len() == 1 && rec.emitted[0].frame.raw == expected)
    }

    #[quickcheck]
    fn prop_source_param_sets_never_copied(slices: Vec<Vec<u8>>, junk: Vec<Vec<u8>>) -> TestResult {
        if slices.is_empty() {
            return TestResult::discard();
        }
        let slices: Vec<Vec<u8>> = slices.iter().take(6).map(|b| body(0x41, b)).collect();
        let junk: Vec<Vec<u8>> = junk
            .iter()
            .take(6)
            .enumerate()
            .map(|(i, b)| body([0x67, 0x68, 0x09][i % 3], b))
            .collect();

        let mut mixed: Vec<&[u8]> = Vec::new();
        for (i, slice) in slices.iter().enumerate() {
            if let Some(j) = junk.get(i) {
                mixed.push(j);
            }
            mixed.push(slice);
        }
        let clean: Vec<&[u8]> = slices.iter().map(|s| s.as_slice()).collect();

        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&avc_seq_header(), &mut rec);
        remuxer.on_ordered_message(&video(0, false, &mixed), &mut rec);
        remuxer.on_ordered_message(&video(40, false, &clean), &mut rec);

        TestResult::from_bool(
            rec.emitted.len() == 2 && rec.emitted[0].frame.raw == rec.emitted[1].frame.raw,
        )
    }

    #[quickcheck]
    fn prop_param_set_injections(pattern: Vec<bool>) -> TestResult {
        if pattern.is_empty() || pattern.len() > 16 {
            return TestResult::discard();
        }
        // true = IDR slice, false = non-IDR slice
        let nals: Vec<Vec<u8>> = pattern
            .iter()
            .map(|&idr| if idr { vec![0x65, 0x11] } else { vec![0x41, 0x11] })
            .collect();
        let refs: Vec<&[u8]> = nals.iter().map(|n| n.as_slice()).collect();

        let mut expected = 0;
        let mut sent = false;
        for &idr in &pattern {
            if idr {
                if !sent {
                    expected += 1;
                }
                sent = true;
            } else {
                sent = false;
            }
        }

        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&avc_seq_header(), &mut rec);
        remuxer.on_ordered_message(&video(0, pattern[0], &refs), &mut rec);

        TestResult::from_bool(
            rec.emitted.len() == 1 && count(&rec.emitted[0].frame.raw, &SPS) == expected,
        )
    }

    #[quickcheck]
    fn prop_audio_frames_conserved(gaps: Vec<u8>) -> bool {
        let mut remuxer = TsRemuxer::default();
        let mut rec = Recorder::default();
        remuxer.on_ordered_message(&aac_seq_header(), &mut rec);

        let mut ts = 0u32;
        let mut stamps = Vec::new();
        for gap in gaps.iter().take(200) {
            ts += u32::from(*gap);
            stamps.push(ts);
            remuxer.on_ordered_message(&audio(ts, &[0x21, 0x10]), &mut rec);
        }
        remuxer.flush_audio(&mut rec);

        let mut consumed = 0;
        for emitted in &rec.emitted {
            let frames = emitted.frame.raw.len() / 9;
            let first = u64::from(stamps[consumed]) * 90;
            let last = u64::from(stamps[consumed + frames - 1]) * 90;
            if emitted.frame.pts != first || last > first + 150 * 90 {
                return false;
            }
            consumed += frames;
        }
        consumed == stamps.len()
    }
}
