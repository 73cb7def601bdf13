use crate::params::ConstParams;
use crate::params::DefaultParams;
use crate::params::Params;
use crate::params::ParamsExt;
use crate::seed::Seed;
use crate::utils::each_params;

#[test]
fn test_empty_seed() {
  let seed: Seed<DefaultParams> = Seed::EMPTY;

  assert!(seed.is_empty());
  assert_eq!(seed.size(), 0);
  assert_eq!(seed.mask(), 0);
  assert_eq!(seed.salt(), 0);
}

#[test]
fn test_compose_zero_size_is_empty() {
  let seed: Seed<DefaultParams> = Seed::compose(u64::MAX, 0);

  assert!(seed.is_empty());
  assert_eq!(seed.mask(), 0);
}

#[test]
fn test_compose_fields() {
  each_params!({
    let limit: usize = P::MAX_TABLE_SIZE.as_usize();

    for size in 0..=limit {
      let seed: Seed<P> = Seed::compose(0xF0F0_F0F0_F0F0_F0F0, size);
      let mask: usize = if size == 0 { 0 } else { size.next_power_of_two() - 1 };

      assert_eq!(seed.size(), size, "invalid seed: size mismatch - {:?}", P::debug());
      assert_eq!(seed.mask(), mask, "invalid seed: mask mismatch - {:?}", P::debug());
      assert_eq!(
        seed.salt(),
        0xF0F0_F0F0_F0F0_F0F0 & P::SALT_MASK,
        "invalid seed: salt mismatch - {:?}",
        P::debug(),
      );
    }
  });
}

#[test]
fn test_compose_salt_does_not_leak_into_size() {
  each_params!({
    let seed: Seed<P> = Seed::compose(u64::MAX, 3);

    assert_eq!(seed.size(), 3, "invalid seed: salt corrupts size - {:?}", P::debug());
    assert_eq!(seed.mask(), 3, "invalid seed: salt corrupts mask - {:?}", P::debug());
  });
}

#[test]
fn test_layout_masks_disjoint() {
  each_params!({
    let size: u64 = P::SIZE_MASK;
    let mask: u64 = P::SIZE_MASK << P::SIZE_SHIFT;

    assert_eq!(size & mask, 0, "invalid params: size fields overlap - {:?}", P::debug());
    assert_eq!(size & P::SALT_MASK, 0, "invalid params: salt overlaps size - {:?}", P::debug());
    assert_eq!(mask & P::SALT_MASK, 0, "invalid params: salt overlaps mask - {:?}", P::debug());
    assert_eq!(size | mask | P::SALT_MASK, u64::MAX);
  });
}

#[test]
fn test_bits_roundtrip() {
  let seed: Seed<DefaultParams> = Seed::compose(0x1234_5678_9ABC_DEF0, 40);
  let copy: Seed<DefaultParams> = Seed::from_bits(seed.into_bits());

  assert_eq!(seed, copy);
  assert_eq!(copy.size(), 40);
  assert_eq!(copy.mask(), 63);
}

#[test]
#[should_panic(expected = "table size exceeds `MAX_TABLE_SIZE`")]
fn test_compose_oversized() {
  let _seed: Seed<ConstParams<16>> = Seed::compose(0, 17);
}

#[test]
fn test_display_hex() {
  let seed: Seed<DefaultParams> = Seed::from_bits(0xAB);
  assert_eq!(format!("{seed}"), "0x00000000000000ab");
}

#[test]
fn test_debug_fields() {
  let seed: Seed<DefaultParams> = Seed::compose(0, 5);
  let debug: String = format!("{seed:?}");

  assert!(debug.contains("size: 5"));
  assert!(debug.contains("mask: 7"));
}
