mod common;

use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use common::{collect_positions, init_logger, TestDoc, TestSegment, REGION_PADDING};
use posting_codec::{
    index::{
        inverted_index::{BufferedPostingIterator, SegmentPosting},
        PostingIterator,
    },
    postings::{
        in_doc::{DecoderArena, InDocPositionState, StatePool},
        ByteSliceList, PostingFormat, SliceLoader, TermPostingWriter,
    },
    DocId, Pos, PostingError, END_DOCID, END_POSITION,
};
use tantivy_common::OwnedBytes;

fn iterate_all(
    format: PostingFormat,
    postings: Vec<SegmentPosting<'_>>,
) -> Vec<(DocId, Vec<Pos>)> {
    let mut decoders = DecoderArena::new();
    let mut pool = StatePool::new();
    let mut iter = BufferedPostingIterator::new(format, postings, &mut decoders, None);

    let mut collected = vec![];
    let mut docid = iter.seek_doc(0).unwrap();
    while docid != END_DOCID {
        let handle = iter.unpack(&mut pool).unwrap();
        let positions = collect_positions(&pool, handle, iter.decoders());
        pool.free(handle);
        collected.push((docid, positions));
        docid = iter.seek_doc(docid + 1).unwrap();
    }
    assert_eq!(iter.seek_doc(0).unwrap(), END_DOCID);
    collected
}

#[test]
fn test_two_segments_with_positions() {
    init_logger();
    let format = PostingFormat::builder().with_position_list().build();
    let first = TestSegment::build(
        format,
        0,
        &[TestDoc::new(0, vec![1, 3]), TestDoc::new(2, vec![0])],
        4,
        false,
    );
    let second = TestSegment::build(format, 4, &[TestDoc::new(1, vec![2, 4, 9])], 4, false);

    let collected = iterate_all(format, vec![first.posting(), second.posting()]);
    assert_eq!(
        collected,
        vec![(0, vec![1, 3]), (2, vec![0]), (5, vec![2, 4, 9])]
    );
}

#[test]
fn test_seek_and_match_data() {
    let format = PostingFormat::builder()
        .with_position_list()
        .with_doc_payload()
        .with_fieldmap()
        .build();
    let docs: Vec<TestDoc> = (0..300)
        .map(|i| TestDoc::new(i * 2, (0..(i % 5 + 1) as Pos).map(|p| p * 4).collect()))
        .collect();
    let segment = TestSegment::build(format, 1000, &docs, 32, false);

    let mut decoders = DecoderArena::new();
    let mut iter =
        BufferedPostingIterator::new(format, vec![segment.posting()], &mut decoders, None);
    assert_eq!(iter.doc_freq(), 300);
    let expected_ttf: u64 = docs.iter().map(|doc| doc.positions.len() as u64).sum();
    assert_eq!(iter.total_term_freq(), expected_ttf);
    assert!(matches!(
        iter.term_freq(),
        Err(PostingError::InvalidArgument(_))
    ));

    assert_eq!(iter.seek(0).unwrap(), 1000);
    assert_eq!(iter.seek(1401).unwrap(), 1402);
    let doc = &docs[201];
    let match_data = iter.match_data().unwrap();
    assert_eq!(match_data.tf as usize, doc.positions.len());
    assert_eq!(match_data.doc_payload, doc.doc_payload());
    assert_eq!(match_data.fieldmap, doc.fieldmap());

    // seeking behind the current doc stays put
    assert_eq!(iter.seek(1100).unwrap(), 1402);
    assert_eq!(iter.docid(), 1402);
    assert_eq!(iter.seek(1598).unwrap(), 1598);
    assert_eq!(iter.seek(1599).unwrap(), END_DOCID);
    assert_eq!(iter.seek(0).unwrap(), END_DOCID);
}

#[test]
fn test_bitmap_mode() {
    init_logger();
    let format = PostingFormat::builder()
        .with_tf_bitmap()
        .with_position_payload()
        .build();
    assert!(!format.has_tflist());
    let first_docs: Vec<TestDoc> = (0..260)
        .map(|i| TestDoc::new(i, (0..(i % 7 + 1) as Pos).map(|p| p * 2 + 1).collect()))
        .collect();
    let second_docs: Vec<TestDoc> = (0..5)
        .map(|i| TestDoc::new(i * 3, vec![i as Pos, 100]))
        .collect();
    let first = TestSegment::build(format, 0, &first_docs, 64, false);
    let second = TestSegment::build(format, 500, &second_docs, 64, false);

    let mut decoders = DecoderArena::new();
    let mut pool = StatePool::new();
    let mut iter = BufferedPostingIterator::new(
        format,
        vec![first.posting(), second.posting()],
        &mut decoders,
        None,
    );

    for doc in [&first_docs[0], &first_docs[129], &first_docs[259]] {
        assert_eq!(iter.seek_doc(doc.docid).unwrap(), doc.docid);
        assert_eq!(iter.term_freq().unwrap() as usize, doc.positions.len());
        let handle = iter.unpack(&mut pool).unwrap();
        assert_eq!(collect_positions(&pool, handle, iter.decoders()), doc.positions);
    }
    for doc in &second_docs[1..] {
        assert_eq!(iter.seek_doc(500 + doc.docid).unwrap(), 500 + doc.docid);
        assert_eq!(iter.match_data().unwrap().tf, 2);
        let handle = iter.unpack(&mut pool).unwrap();
        assert_eq!(collect_positions(&pool, handle, iter.decoders()), doc.positions);
    }
    assert_eq!(pool.len(), 7);
}

#[test]
fn test_dict_inline_segment() {
    let format = PostingFormat::builder().with_position_list().build();
    let first = TestSegment::build(format, 0, &[TestDoc::new(3, vec![5])], 8, false);
    let inline = TestSegment::build(format, 10, &[TestDoc::new(4, vec![1, 2])], 8, true);
    let last = TestSegment::build(
        format,
        20,
        &[TestDoc::new(0, vec![0]), TestDoc::new(9, vec![7, 8])],
        8,
        true,
    );
    assert!(inline.inline_doc.is_some());
    assert!(last.inline_doc.is_none());

    let collected = iterate_all(
        format,
        vec![first.posting(), inline.posting(), last.posting()],
    );
    assert_eq!(
        collected,
        vec![
            (3, vec![5]),
            (14, vec![1, 2]),
            (20, vec![0]),
            (29, vec![7, 8]),
        ]
    );
}

#[test]
fn test_shared_decoder_and_release() {
    let format = PostingFormat::builder().with_position_list().build();
    let docs: Vec<TestDoc> = (0..100)
        .map(|i| TestDoc::new(i, (0..3).map(|p| p * 10 + i as Pos).collect()))
        .collect();
    let segment = TestSegment::build(format, 0, &docs, 16, false);

    let mut decoders = DecoderArena::new();
    let mut pool = StatePool::new();
    let (first, second) = {
        let mut iter =
            BufferedPostingIterator::new(format, vec![segment.posting()], &mut decoders, None);
        iter.seek_doc(40).unwrap();
        let first = iter.unpack(&mut pool).unwrap();
        iter.seek_doc(90).unwrap();
        let second = iter.unpack(&mut pool).unwrap();

        let first_state = pool.try_get(first).unwrap().clone();
        let second_state = pool.try_get(second).unwrap().clone();
        assert_eq!(first_state.decoder(), second_state.decoder());

        let mut first_iter = first_state.create_iterator(iter.decoders()).unwrap();
        let mut second_iter = second_state.create_iterator(iter.decoders()).unwrap();
        // take turns on the shared decoder
        assert_eq!(second_iter.seek_position(iter.decoders(), 0).unwrap(), 90);
        assert_eq!(first_iter.seek_position(iter.decoders(), 0).unwrap(), 40);
        assert_eq!(second_iter.seek_position(iter.decoders(), 95).unwrap(), 100);
        assert_eq!(first_iter.seek_position(iter.decoders(), 0).unwrap(), 50);
        assert_eq!(first_iter.seek_position(iter.decoders(), 61).unwrap(), END_POSITION);
        assert_eq!(second_iter.seek_position(iter.decoders(), 0).unwrap(), 110);
        assert_eq!(iter.decoders().len(), 1);
        (first, second)
    };
    assert!(decoders.is_empty());

    // states outlive the decoders they were bound to
    let state = pool.try_get(first).unwrap().clone();
    let mut stale = state.create_iterator(&decoders).unwrap();
    assert!(matches!(
        stale.seek_position(&mut decoders, 0),
        Err(PostingError::StaleHandle)
    ));
    assert!(pool.free(second).is_some());
    assert!(pool.try_get(second).is_err());
}

struct CountingLoader {
    data: Vec<u8>,
    loads: AtomicUsize,
}

impl SliceLoader for CountingLoader {
    fn load(&self, offset: usize, len: usize) -> io::Result<OwnedBytes> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(OwnedBytes::new(self.data[offset..offset + len].to_vec()))
    }
}

#[test]
fn test_on_demand_doc_list() {
    let format = PostingFormat::builder().build();
    let mut writer = TermPostingWriter::new(format);
    for docid in 0..2000 {
        writer.add_doc(docid * 2, 1, 0, 0);
    }
    let mut doc_buf = vec![0; REGION_PADDING];
    let dump = writer.dump(&mut doc_buf, io::sink()).unwrap();

    let slice_len = 64;
    let slice_lens: Vec<usize> = doc_buf.chunks(slice_len).map(|chunk| chunk.len()).collect();
    let loader = Arc::new(CountingLoader {
        data: doc_buf.clone(),
        loads: AtomicUsize::new(0),
    });
    let doc_list = ByteSliceList::on_demand(&slice_lens, loader.clone());
    let posting = SegmentPosting::new(0, dump.term_meta, &doc_list, REGION_PADDING);

    let mut decoders = DecoderArena::new();
    let mut iter = BufferedPostingIterator::new(format, vec![posting], &mut decoders, None);
    assert_eq!(iter.seek_doc(3901).unwrap(), 3902);
    assert_eq!(iter.term_freq().unwrap(), 1);
    assert!(loader.loads.load(Ordering::Relaxed) < slice_lens.len());
    assert_eq!(iter.seek_doc(3999).unwrap(), END_DOCID);
}
