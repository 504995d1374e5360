// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn stays_closed_below_failure_threshold() {
    let breaker = CircuitBreaker::new();
    for _ in 0..4 {
        breaker.record_failure();
    }
    assert!(breaker.allow_request());
}

#[test]
fn opens_after_five_consecutive_failures() {
    let breaker = CircuitBreaker::new();
    for _ in 0..5 {
        breaker.record_failure();
    }
    assert!(!breaker.allow_request());
}

#[test]
fn success_resets_failure_count() {
    let breaker = CircuitBreaker::new();
    for _ in 0..4 {
        breaker.record_failure();
    }
    breaker.record_success();
    for _ in 0..4 {
        breaker.record_failure();
    }
    assert!(breaker.allow_request());
}

#[test]
fn half_open_failure_reopens_the_circuit() {
    let breaker = CircuitBreaker::new();
    for _ in 0..5 {
        breaker.record_failure();
    }
    {
        let mut inner = breaker.inner.lock();
        inner.state = State::HalfOpen;
    }
    breaker.record_failure();
    {
        let inner = breaker.inner.lock();
        assert_eq!(inner.state, State::Open);
    }
}

#[test]
fn half_open_success_closes_the_circuit() {
    let breaker = CircuitBreaker::new();
    for _ in 0..5 {
        breaker.record_failure();
    }
    {
        let mut inner = breaker.inner.lock();
        inner.state = State::HalfOpen;
    }
    breaker.record_success();
    assert!(breaker.allow_request());
}
