//! End-to-end flows through the public surface: chains of `then`, joins fed by
//! chains, and observers attached through promises.

use std::cell::RefCell;
use std::rc::Rc;

use pledge_deferred::{Deferred, Filters, Flow, Outcome, Promise, State, when};
use pretty_assertions::assert_eq;
use rstest::rstest;
use {pledge_callbacks as _, proptest as _, tracing as _};

type Log = Rc<RefCell<Vec<String>>>;

fn tagged(log: &Log, tag: &'static str) -> impl Fn(&[i64]) + 'static {
	let log = Rc::clone(log);
	move |args: &[i64]| log.borrow_mut().push(format!("{tag}{args:?}"))
}

fn double(args: &[i64]) -> Outcome<i64> {
	Outcome::Value(args.iter().sum::<i64>() * 2)
}

/// Chains `depth` doubling filters onto `source`.
fn chain(depth: usize, source: &Deferred<i64>) -> Promise<i64> {
	let mut promise = source.promise();
	for _ in 0..depth {
		promise = promise.then(double);
	}
	promise
}

#[rstest]
#[case(0, 3)]
#[case(1, 6)]
#[case(4, 48)]
fn long_chains_apply_each_filter_once(#[case] depth: usize, #[case] expected: i64) {
	let log = Log::default();
	let source = Deferred::new();
	chain(depth, &source).done(tagged(&log, ""));
	source.resolve([1, 2]);
	let expected = if depth == 0 { "[1, 2]".to_owned() } else { format!("[{expected}]") };
	assert_eq!(*log.borrow(), vec![expected]);
}

#[test]
fn rejection_skips_done_filters_down_the_chain() {
	let log = Log::default();
	let source = Deferred::new();
	let end = chain(3, &source);
	end.done(tagged(&log, "done")).fail(tagged(&log, "fail"));
	source.reject([5]);
	assert_eq!(end.state(), State::Rejected);
	assert_eq!(*log.borrow(), vec!["fail[5]"]);
}

#[test]
fn recovery_turns_a_rejection_into_a_resolution() {
	let log = Log::default();
	let source = Deferred::new();
	source
		.then_with(Filters::new().fail(|args: &[i64]| Outcome::from(Deferred::resolved([-args[0]]))))
		.then(double)
		.always(tagged(&log, "always"));
	source.reject([4]);
	assert_eq!(*log.borrow(), vec!["always[-8]"]);
}

#[test]
fn progress_flows_through_a_chain_until_settlement() {
	let log = Log::default();
	let source = Deferred::new();
	let end = source.then_with(Filters::new().progress(double)).then(double);
	end.progress(tagged(&log, "p")).done(tagged(&log, "done"));

	source.notify([1]).notify([2]).resolve([10]).notify([3]);
	assert_eq!(*log.borrow(), vec!["p[2]", "p[4]", "done[20]"]);
}

#[test]
fn joins_of_chains_keep_input_order() {
	let log = Log::default();
	let (a, b) = (Deferred::new(), Deferred::new());
	when([Outcome::from(a.then(double)), Outcome::Value(100), Outcome::from(b.promise())]).done(tagged(&log, "joined"));

	b.resolve([7, 8]);
	a.resolve([1, 2]);
	assert_eq!(*log.borrow(), vec!["joined[6, 100, 7]"]);
}

#[test]
fn chain_on_a_join_sees_positional_results() {
	let log = Log::default();
	let (a, b) = (Deferred::new(), Deferred::new());
	when([Outcome::from(a.clone()), Outcome::from(b.clone())])
		.then(|args: &[i64]| Outcome::Value(args[0] - args[1]))
		.done(tagged(&log, "diff"));

	a.resolve([10]);
	b.resolve([3]);
	assert_eq!(*log.borrow(), vec!["diff[7]"]);
}

#[test]
fn observer_return_values_never_halt_settlement_observers() {
	let log = Log::default();
	let deferred = Deferred::new();
	deferred
		.done(|_: &[i64]| false)
		.done(|_: &[i64]| Flow::Halt)
		.done(tagged(&log, "third"));
	deferred.resolve([1]);
	assert_eq!(*log.borrow(), vec!["third[1]"]);
}

#[test]
fn promise_handles_outlive_the_producer_handle() {
	let log = Log::default();
	let promise = {
		let deferred = Deferred::with(|d| {
			d.notify([1]);
		});
		let promise = deferred.promise();
		deferred.resolve([2]);
		promise
	};
	promise.done(tagged(&log, "done")).progress(tagged(&log, "p"));
	assert_eq!(*log.borrow(), vec!["done[2]", "p[1]"]);
}
