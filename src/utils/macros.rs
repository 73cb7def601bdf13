#[cfg(miri)]
macro_rules! each_params {
  ($expr:expr) => {{
    each_params!(@run, $expr, $crate::tests::PowerOfTwo<{ 1 << 5 }>);
    each_params!(@run, $expr, $crate::tests::Modulo<{ 1 << 5 }>);
    each_params!(@run, $expr, $crate::tests::Reflect<{ 1 << 5 }>);
  }};
  (@run, $expr:expr, $params:ty) => {{
    type P = $params;
    $expr
  }};
}

#[cfg(not(miri))]
macro_rules! each_params {
  ($expr:expr) => {{
    each_params!(@run, $expr, $crate::tests::PowerOfTwo<{ 1 << 2 }>);
    each_params!(@run, $expr, $crate::tests::PowerOfTwo<{ 1 << 5 }>);
    each_params!(@run, $expr, $crate::tests::PowerOfTwo<{ 1 << 7 }>);
    each_params!(@run, $expr, $crate::tests::PowerOfTwo<{ 1 << 10 }>);
    each_params!(@run, $expr, $crate::tests::Modulo<{ 1 << 2 }>);
    each_params!(@run, $expr, $crate::tests::Modulo<{ 1 << 5 }>);
    each_params!(@run, $expr, $crate::tests::Modulo<{ 1 << 7 }>);
    each_params!(@run, $expr, $crate::tests::Modulo<{ 1 << 10 }>);
    each_params!(@run, $expr, $crate::tests::Reflect<{ 1 << 2 }>);
    each_params!(@run, $expr, $crate::tests::Reflect<{ 1 << 5 }>);
    each_params!(@run, $expr, $crate::tests::Reflect<{ 1 << 7 }>);
    each_params!(@run, $expr, $crate::tests::Reflect<{ 1 << 10 }>);
  }};
  (@run, $expr:expr, $params:ty) => {{
    type P = $params;
    $expr
  }};
}

pub(crate) use each_params;
