use crate::class::Class;
use crate::class::ClassRef;
use crate::hash::HashAllocator;
use crate::params::ConstParams;
use crate::tests::Shallow;
use crate::tests::chain;
use crate::tests::interfaces;
use crate::verify::Report;

fn leaf(count: usize, alloc: &mut HashAllocator) -> ClassRef<ConstParams<8>> {
  let implemented: Vec<ClassRef<ConstParams<8>>> = interfaces(count, alloc);
  Class::new_class("Leaf", None, &implemented, alloc).unwrap()
}

#[test]
fn test_report_default_ok() {
  assert!(Report::default().is_ok());

  let report: Report = Report {
    untagged: 1,
    ..Report::default()
  };

  assert!(!report.is_ok());
}

#[test]
fn test_verify_built_tables() {
  let mut alloc: HashAllocator = HashAllocator::default();

  for count in 0..40 {
    let class: ClassRef<ConstParams<8>> = leaf(count, &mut alloc);
    let report: Report = class.verify().unwrap();

    assert!(report.is_ok(), "{count} interfaces: {report}");
  }
}

#[test]
fn test_verify_overflow_supers() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let classes: Vec<ClassRef<Shallow>> = chain(12, &mut alloc);

  for class in &classes {
    assert!(class.verify().unwrap().is_ok(), "{class}");
  }
}

#[test]
fn test_verify_unpublished() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let implemented: Vec<ClassRef> = interfaces(5, &mut alloc);
  let class: ClassRef = Class::declare_class("Leaf", None, &implemented, &mut alloc).unwrap();
  let report: Report = class.verify().unwrap();

  assert_eq!(report.missing, 5);
  assert!(!report.is_ok());
}

#[test]
fn test_verify_on() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let class: ClassRef<ConstParams<8>> = leaf(20, &mut alloc);
  let mut output: String = String::new();

  assert!(class.verify_on(&mut output).unwrap());
  assert!(output.starts_with("verify Leaf: ok"));
  assert!(output.contains("misplaced=0"));
}

#[test]
fn test_dump_summary() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let class: ClassRef<ConstParams<8>> = leaf(20, &mut alloc);
  let mut output: String = String::new();

  class.dump_on(&mut output, false).unwrap();

  assert!(output.contains("--- Leaf: 20 secondary supers"));
  assert!(output.contains("primary seed="));
  assert!(output.contains("secondary seed="));
  assert!(output.contains("tail size="));
  assert!(!output.contains("I1 "));
}

#[test]
fn test_dump_verbose() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let class: ClassRef<ConstParams<8>> = leaf(20, &mut alloc);
  let mut output: String = String::new();

  class.dump_on(&mut output, true).unwrap();

  for index in 1..=20 {
    assert!(output.contains(&format!("I{index} ")), "I{index} missing from dump");
  }

  // Every slot resident sits at its natural slot.
  assert!(!output.lines().any(|line| line.starts_with('!')));
}

#[test]
fn test_dump_unpublished() {
  let mut alloc: HashAllocator = HashAllocator::default();
  let class: ClassRef = Class::declare_class("Lazy", None, &[], &mut alloc).unwrap();
  let mut output: String = String::new();

  class.dump_on(&mut output, true).unwrap();

  assert_eq!(output, "--- Lazy: secondary supers not initialized ---\n");
}
