use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::Level;

use crate::hash::HashAllocator;
use crate::hash::SeedSource;
use crate::pack::Packing;
use crate::params::Capacity;
use crate::params::ConstParams;
use crate::params::DefaultParams;
use crate::params::LinearParams;
use crate::params::Params;
use crate::params::ParamsExt;
use crate::params::Sizing;
use crate::search::Score;
use crate::search::initial_size;
use crate::search::next_size;
use crate::search::search;
use crate::tests::FixedSeeds;
use crate::tests::Modulo;
use crate::utils::each_params;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

struct Rigid;

impl Params for Rigid {
  const ALLOW_RESIZING: bool = false;
}

struct Stingy;

impl Params for Stingy {
  const MAX_ATTEMPTS: usize = 4;
  const MAX_TOTAL_ATTEMPTS: usize = 4;
}

/// Counts every seed it hands out.
struct Counting {
  inner: HashAllocator,
  drawn: usize,
}

impl SeedSource for Counting {
  fn next_seed(&mut self) -> u64 {
    self.drawn += 1;
    self.inner.next_seed()
  }
}

#[test]
fn test_score_ordering() {
  let a: Score = Score::new(0, 5, 9);
  let b: Score = Score::new(1, 0, 0);
  let c: Score = Score::new(1, 1, 0);
  let d: Score = Score::new(1, 1, 1);

  assert!(a < b);
  assert!(b < c);
  assert!(c < d);
  assert_eq!(Score::new(2, 2, 2), Score::new(2, 2, 2));
}

#[test]
fn test_initial_size_small_inputs() {
  assert_eq!(initial_size::<DefaultParams>(0), 0);
  assert_eq!(initial_size::<DefaultParams>(DefaultParams::MIN_TABLE_SIZE - 1), 0);
  assert_eq!(initial_size::<LinearParams>(100), 0);
}

#[test]
fn test_initial_size_power_of_two() {
  assert_eq!(initial_size::<DefaultParams>(4), 4);
  assert_eq!(initial_size::<DefaultParams>(5), 8);
  assert_eq!(initial_size::<DefaultParams>(20), 32);
  assert_eq!(initial_size::<DefaultParams>(1000), Capacity::DEF.as_usize());
}

#[test]
fn test_initial_size_chunked() {
  type P = Modulo<128>;

  assert_eq!(initial_size::<P>(4), 8);
  assert_eq!(initial_size::<P>(9), 16);
  assert_eq!(initial_size::<P>(20), 24);
}

#[test]
fn test_initial_size_capped() {
  each_params!({
    let limit: usize = P::MAX_TABLE_SIZE.as_usize();

    for count in 0..300 {
      assert!(
        initial_size::<P>(count) <= limit,
        "invalid ladder: initial size exceeds limit - {:?}",
        P::debug(),
      );
    }
  });
}

#[test]
fn test_next_size_ladder() {
  assert_eq!(next_size::<DefaultParams>(8, 20), Some(16));
  assert_eq!(next_size::<DefaultParams>(32, 20), Some(64));
  assert_eq!(next_size::<DefaultParams>(64, 20), None);
  assert_eq!(next_size::<DefaultParams>(128, 100), None);
  assert_eq!(next_size::<Modulo<128>>(24, 20), Some(32));
  assert_eq!(next_size::<Modulo<128>>(120, 100), Some(128));
  assert_eq!(next_size::<Rigid>(8, 20), None);
  assert_eq!(next_size::<DefaultParams>(0, 20), None);
}

#[test]
fn test_next_size_terminates() {
  each_params!({
    let mut size: usize = initial_size::<P>(200);
    let mut steps: usize = 0;

    while let Some(next) = next_size::<P>(size, 200) {
      assert!(next > size, "invalid ladder: not increasing - {:?}", P::debug());
      assert!(next <= P::MAX_TABLE_SIZE.as_usize());

      size = next;
      steps += 1;
    }

    assert!(steps < 256, "invalid ladder: too many steps - {:?}", P::debug());
  });
}

#[test]
fn test_search_too_small_for_table() {
  let keys: [u32; 3] = [1, 2, 3];
  let mut seeds: HashAllocator = HashAllocator::default();
  let packing: Packing<u32, DefaultParams> = search(&[&keys], &mut seeds);

  assert_eq!(packing.size(), 0);
  assert_eq!(packing.tail(), &keys);
}

#[test]
fn test_search_empty() {
  let mut seeds: HashAllocator = HashAllocator::default();
  let packing: Packing<u32, DefaultParams> = search(&[], &mut seeds);

  assert!(packing.is_empty());
  assert_eq!(packing.size(), 0);
}

#[test]
fn test_search_linear_params() {
  let keys: Vec<u32> = (0..50).collect();
  let mut seeds: Counting = Counting {
    inner: HashAllocator::default(),
    drawn: 0,
  };

  let packing: Packing<u32, LinearParams> = search(&[&keys], &mut seeds);

  assert_eq!(packing.size(), 0);
  assert_eq!(packing.tail().len(), 50);
  assert_eq!(seeds.drawn, 0);
}

#[test]
fn test_search_keeps_everything() {
  each_params!({
    let keys: Vec<u32> = (0..40).map(|key| key * 7919).collect();
    let mut seeds: HashAllocator = HashAllocator::new(0xFEED);
    let packing: Packing<u32, P> = search(&[&keys], &mut seeds);

    assert_eq!(packing.len(), keys.len(), "invalid search: lost keys - {:?}", P::debug());
    assert!(packing.size() <= P::MAX_TABLE_SIZE.as_usize());
  });
}

#[test]
fn test_search_reproducible() {
  let keys: Vec<u32> = (0..20).map(|key| key * 104_729).collect();

  let a: Packing<u32, DefaultParams> = search(&[&keys], &mut HashAllocator::new(5));
  let b: Packing<u32, DefaultParams> = search(&[&keys], &mut HashAllocator::new(5));

  assert_eq!(a.seed(), b.seed());
  assert_eq!(a.slots(), b.slots());
  assert_eq!(a.tail(), b.tail());
}

#[test]
fn test_search_total_attempts_cap() {
  let keys: Vec<u32> = (0..64).collect();
  let mut seeds: Counting = Counting {
    inner: HashAllocator::default(),
    drawn: 0,
  };

  let _packing: Packing<u32, Stingy> = search(&[&keys], &mut seeds);

  assert!(seeds.drawn <= Stingy::MAX_TOTAL_ATTEMPTS);
}

#[test]
fn test_search_stops_on_perfect() {
  let keys: Vec<u32> = (0..4).collect();
  let mut seeds: Counting = Counting {
    inner: HashAllocator::new(11),
    drawn: 0,
  };

  let packing: Packing<u32, ConstParams<1024>> = search(&[&keys], &mut seeds);

  if packing.is_perfect() {
    assert!(seeds.drawn <= ConstParams::<1024>::MAX_TOTAL_ATTEMPTS);
  }

  assert_eq!(packing.len(), 4);
}

#[test]
fn test_search_fixed_seed_collisions_end_in_tail() {
  // Every attempt reuses one seed, so the search cannot escape collisions.
  let keys: Vec<u32> = (0..8).collect();
  let packing: Packing<u32, Rigid> = search(&[&keys], &mut FixedSeeds(0));

  assert_eq!(packing.size(), 8);
  assert_eq!(packing.residents() + packing.tail().len(), 8);
}

#[test]
fn test_search_never_worse_than_first_attempt() {
  let keys: Vec<u32> = (0_u32..24).map(|key| key.wrapping_mul(0x9E37_79B9)).collect();
  let packing: Packing<u32, DefaultParams> = search(&[&keys], &mut HashAllocator::new(77));

  // A size-0 packing would put all 24 keys in the tail.
  assert!(packing.score().tail() < keys.len());
  assert!(DefaultParams::SIZING == Sizing::PowerOfTwo);
}

#[test]
fn test_search_reports_attempts_and_elapsed() {
  let capture: Capture = Capture::default();
  let writer: Capture = capture.clone();

  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_ansi(false)
    .with_writer(move || writer.clone())
    .finish();

  let keys: Vec<u32> = (0_u32..24).map(|key| key.wrapping_mul(0x85EB_CA6B)).collect();

  tracing::subscriber::with_default(subscriber, || {
    let packing: Packing<u32, DefaultParams> = search(&[&keys], &mut HashAllocator::new(5));
    assert_eq!(packing.len(), keys.len());
  });

  let output: String = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();

  assert!(output.contains("secondary supers search finished"), "{output}");
  assert!(output.contains("attempts="), "{output}");
  assert!(output.contains("elapsed="), "{output}");
}
