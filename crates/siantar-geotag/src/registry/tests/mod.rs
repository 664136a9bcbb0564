pub(super) mod common;

mod routing;
