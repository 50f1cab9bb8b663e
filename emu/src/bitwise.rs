/// Helper methods to manipulate bits. The index (`bit_idx`) counts from
/// lsb to msb (right to left).
pub trait Bits: Copy {
    fn get_bit(self, bit_idx: u8) -> bool;
    fn set_bit(&mut self, bit_idx: u8, value: bool);

    fn set_bit_on(&mut self, bit_idx: u8) {
        self.set_bit(bit_idx, true);
    }

    fn set_bit_off(&mut self, bit_idx: u8) {
        self.set_bit(bit_idx, false);
    }

    fn get_byte(self, byte_nth: u8) -> u8;
    fn set_byte(&mut self, byte_nth: u8, value: u8);
}

macro_rules! impl_bits {
    ($($t:ty),*) => {
        $(
            impl Bits for $t {
                fn get_bit(self, bit_idx: u8) -> bool {
                    debug_assert!(bit_idx < <$t>::BITS as u8);
                    self & (1 << bit_idx) != 0
                }

                fn set_bit(&mut self, bit_idx: u8, value: bool) {
                    debug_assert!(bit_idx < <$t>::BITS as u8);
                    if value {
                        *self |= 1 << bit_idx;
                    } else {
                        *self &= !(1 << bit_idx);
                    }
                }

                fn get_byte(self, byte_nth: u8) -> u8 {
                    debug_assert!(u32::from(byte_nth) < <$t>::BITS / 8);
                    (self >> (byte_nth * 8)) as u8
                }

                fn set_byte(&mut self, byte_nth: u8, value: u8) {
                    debug_assert!(u32::from(byte_nth) < <$t>::BITS / 8);
                    let shift = byte_nth * 8;
                    *self = (*self & !((0xFF as $t) << shift)) | ((value as $t) << shift);
                }
            }
        )*
    };
}

impl_bits!(u8, u16);
